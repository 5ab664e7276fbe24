//! Index definitions.

use serde::{Deserialize, Serialize};

/// An index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Owning table name.
    pub table_name: String,
    /// Indexed columns, in key order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub is_unique: bool,
    /// Whether the index backs the primary key.
    pub is_primary: bool,
    /// Access method (btree, hash, gin, gist, ...).
    pub method: String,
    /// Full definition as rendered by `pg_get_indexdef`, if known.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub definition: String,
}

impl Index {
    /// Create a btree index.
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            method: "btree".to_string(),
            ..Self::default()
        }
    }

    /// Mark the index as unique.
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Mark the index as backing a primary key.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_unique = true;
        self
    }

    /// Set the access method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the full definition.
    pub fn definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// Equality as the differ sees it: uniqueness, primary flag, method and
    /// ordered columns. The rendered definition is not compared.
    pub fn same_definition(&self, other: &Index) -> bool {
        self.name == other.name
            && self.is_unique == other.is_unique
            && self.is_primary == other.is_primary
            && self.method == other.method
            && self.columns == other.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_definition() {
        let a = Index::new("idx_users_email", "users", ["email"]);
        assert!(a.same_definition(&a.clone()));
        assert!(!a.same_definition(&a.clone().unique()));
        assert!(!a.same_definition(&a.clone().method("hash")));
        assert!(!a.same_definition(&Index::new("idx_users_email", "users", ["email", "id"])));
    }

    #[test]
    fn test_column_order_matters() {
        let a = Index::new("idx", "t", ["a", "b"]);
        let b = Index::new("idx", "t", ["b", "a"]);
        assert!(!a.same_definition(&b));
    }

    #[test]
    fn test_definition_text_is_ignored() {
        let a = Index::new("idx", "t", ["a"]).definition("CREATE INDEX idx ON public.t USING btree (a)");
        let b = Index::new("idx", "t", ["a"]);
        assert!(a.same_definition(&b));
    }
}
