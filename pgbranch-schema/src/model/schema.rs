//! Top-level schema snapshot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::enum_type::Enum;
use super::function::Function;
use super::table::Table;

/// A structural snapshot of one database.
///
/// Map iteration order carries no meaning; use the `sorted_*` accessors when
/// output must be deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Snapshot name (usually the database name).
    pub name: String,
    /// Tables by name.
    #[serde(default)]
    pub tables: IndexMap<String, Table>,
    /// Enums by name.
    #[serde(default)]
    pub enums: IndexMap<String, Enum>,
    /// Functions by signature.
    #[serde(default)]
    pub functions: IndexMap<String, Function>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a table, keyed by name.
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Add an enum, keyed by name.
    pub fn add_enum(&mut self, e: Enum) {
        self.enums.insert(e.name.clone(), e);
    }

    /// Add a function, keyed by signature.
    pub fn add_function(&mut self, function: Function) {
        self.functions.insert(function.signature(), function);
    }

    /// Builder form of [`Schema::add_table`].
    pub fn with_table(mut self, table: Table) -> Self {
        self.add_table(table);
        self
    }

    /// Builder form of [`Schema::add_enum`].
    pub fn with_enum(mut self, e: Enum) -> Self {
        self.add_enum(e);
        self
    }

    /// Builder form of [`Schema::add_function`].
    pub fn with_function(mut self, function: Function) -> Self {
        self.add_function(function);
        self
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Get an enum by name.
    pub fn get_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.get(name)
    }

    /// Get a function by signature.
    pub fn get_function(&self, signature: &str) -> Option<&Function> {
        self.functions.get(signature)
    }

    /// Whether the schema has no objects at all.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.enums.is_empty() && self.functions.is_empty()
    }

    /// Tables sorted by name.
    pub fn sorted_tables(&self) -> Vec<&Table> {
        let mut tables: Vec<&Table> = self.tables.values().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }

    /// Enums sorted by name.
    pub fn sorted_enums(&self) -> Vec<&Enum> {
        let mut enums: Vec<&Enum> = self.enums.values().collect();
        enums.sort_by(|a, b| a.name.cmp(&b.name));
        enums
    }

    /// Functions sorted by signature.
    pub fn sorted_functions(&self) -> Vec<&Function> {
        let mut functions: Vec<&Function> = self.functions.values().collect();
        functions.sort_by_key(|f| f.signature());
        functions
    }
}
