//! Table columns and their canonical type rendering.

use serde::{Deserialize, Serialize};

/// A column of a base table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Base type name as reported by the catalog (element type for arrays).
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub is_nullable: bool,
    /// Default expression as source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// 1-based ordinal position within the table.
    pub position: i32,
    /// Character maximum length (varchar/char).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_max_length: Option<i32>,
    /// Numeric precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_precision: Option<i32>,
    /// Numeric scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_scale: Option<i32>,
    /// Whether this is an array column.
    #[serde(default)]
    pub is_array: bool,
    /// Element type for array columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
}

impl Column {
    /// Create a column with the given base type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            ..Self::default()
        }
    }

    /// Set nullability.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    /// Set the default expression.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the ordinal position.
    pub fn position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Set the character maximum length.
    pub fn char_max_length(mut self, len: i32) -> Self {
        self.char_max_length = Some(len);
        self
    }

    /// Set numeric precision and optional scale.
    pub fn numeric(mut self, precision: i32, scale: Option<i32>) -> Self {
        self.numeric_precision = Some(precision);
        self.numeric_scale = scale;
        self
    }

    /// Mark this column as an array of its base type.
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self.element_type = Some(self.data_type.clone());
        self
    }

    /// The canonical type string used for type equality.
    ///
    /// `character varying` with a length becomes `varchar(n)`, `character`
    /// becomes `char(n)`, numerics carry precision and scale, and arrays get
    /// a `[]` suffix.
    pub fn full_type(&self) -> String {
        let mut ty = self.data_type.clone();

        if let Some(len) = self.char_max_length {
            if ty.starts_with("character varying") {
                ty = format!("varchar({len})");
            } else if ty == "character" {
                ty = format!("char({len})");
            }
        }

        if let Some(precision) = self.numeric_precision {
            match self.numeric_scale {
                Some(scale) if scale > 0 => ty = format!("numeric({precision},{scale})"),
                _ if ty == "numeric" => ty = format!("numeric({precision})"),
                _ => {}
            }
        }

        if self.is_array {
            ty.push_str("[]");
        }

        ty
    }

    /// Structural equality on the attributes the differ compares.
    pub fn same_definition(&self, other: &Column) -> bool {
        self.name == other.name
            && self.full_type() == other.full_type()
            && self.is_nullable == other.is_nullable
            && self.default == other.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_type_plain() {
        assert_eq!(Column::new("id", "integer").full_type(), "integer");
    }

    #[test]
    fn test_full_type_varchar() {
        let col = Column::new("email", "character varying").char_max_length(255);
        assert_eq!(col.full_type(), "varchar(255)");
    }

    #[test]
    fn test_full_type_char() {
        let col = Column::new("code", "character").char_max_length(10);
        assert_eq!(col.full_type(), "char(10)");
    }

    #[test]
    fn test_full_type_numeric() {
        assert_eq!(
            Column::new("n", "numeric").numeric(10, None).full_type(),
            "numeric(10)"
        );
        assert_eq!(
            Column::new("n", "numeric").numeric(10, Some(2)).full_type(),
            "numeric(10,2)"
        );
    }

    #[test]
    fn test_full_type_integer_precision_is_ignored() {
        // information_schema reports precision 32 / scale 0 for integer
        let col = Column::new("id", "integer").numeric(32, Some(0));
        assert_eq!(col.full_type(), "integer");
    }

    #[test]
    fn test_full_type_array() {
        assert_eq!(Column::new("tags", "text").array().full_type(), "text[]");
    }

    #[test]
    fn test_same_definition() {
        let a = Column::new("id", "integer").nullable(false);
        let b = Column::new("id", "integer").nullable(false);
        assert!(a.same_definition(&b));

        assert!(!a.same_definition(&Column::new("id", "bigint").nullable(false)));
        assert!(!a.same_definition(&Column::new("id", "integer")));
        assert!(!a.same_definition(&b.clone().default_value("0")));
        assert!(!a.same_definition(&Column::new("user_id", "integer").nullable(false)));
    }

    #[test]
    fn test_position_is_not_compared() {
        let a = Column::new("id", "integer").position(1);
        let b = Column::new("id", "integer").position(3);
        assert!(a.same_definition(&b));
    }
}
