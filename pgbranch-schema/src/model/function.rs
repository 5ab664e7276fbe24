//! Stored functions and procedures.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::name::is_default_schema;

/// Number of SHA-256 bytes kept in a body fingerprint.
const BODY_HASH_BYTES: usize = 8;

/// A function or procedure. Identity is its signature, so overloads are
/// distinct functions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Owning schema.
    #[serde(default)]
    pub schema: String,
    /// Argument list as rendered by `pg_get_function_arguments`.
    #[serde(default)]
    pub arguments: String,
    /// Return type as rendered by `pg_get_function_result`.
    #[serde(default)]
    pub return_type: String,
    /// Implementation language (plpgsql, sql, ...).
    #[serde(default)]
    pub language: String,
    /// Full `CREATE FUNCTION` text.
    pub definition: String,
    /// Short fingerprint of `definition`.
    pub body_hash: String,
}

impl Function {
    /// Create a function, fingerprinting its definition.
    pub fn new(
        name: impl Into<String>,
        arguments: impl Into<String>,
        return_type: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        let definition = definition.into();
        Self {
            name: name.into(),
            schema: String::new(),
            arguments: arguments.into(),
            return_type: return_type.into(),
            language: String::new(),
            body_hash: body_hash(&definition),
            definition,
        }
    }

    /// Set the owning schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the implementation language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// `name(arguments)`, the unit of identity.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }

    /// Signature qualified by a non-default schema.
    pub fn full_name(&self) -> String {
        if is_default_schema(&self.schema) {
            self.signature()
        } else {
            format!("{}.{}", self.schema, self.signature())
        }
    }

    /// Equality by signature, return type and body fingerprint.
    pub fn same_definition(&self, other: &Function) -> bool {
        self.signature() == other.signature()
            && self.return_type == other.return_type
            && self.body_hash == other.body_hash
    }
}

/// Fingerprint a function definition: the first bytes of its SHA-256, hex encoded.
pub fn body_hash(definition: &str) -> String {
    let digest = Sha256::digest(definition.as_bytes());
    hex::encode(&digest[..BODY_HASH_BYTES])
}
