//! Sort order descriptors for paginated result sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named field a result set can be ordered by
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortingField(String);

impl SortingField {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The name as a quoted SQL identifier; `order.status` becomes `"order"."status"`
    ///
    /// Embedded double quotes are doubled, so the result can never terminate the
    /// identifier early.
    pub fn quoted_identifier(&self) -> String {
        self.0
            .split('.')
            .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for SortingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SortingField {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortingDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortingDirection {
    pub fn reverse(self) -> Self {
        match self {
            SortingDirection::Ascending => SortingDirection::Descending,
            SortingDirection::Descending => SortingDirection::Ascending,
        }
    }

    /// SQL keyword for this direction
    pub fn as_sql(self) -> &'static str {
        match self {
            SortingDirection::Ascending => "ASC",
            SortingDirection::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A field paired with the direction to order it in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedSortingField {
    pub field: SortingField,
    pub direction: SortingDirection,
}

impl DirectedSortingField {
    pub fn new(field: impl Into<SortingField>, direction: SortingDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<SortingField>) -> Self {
        Self::new(field, SortingDirection::Ascending)
    }

    pub fn descending(field: impl Into<SortingField>) -> Self {
        Self::new(field, SortingDirection::Descending)
    }

    /// Same field, opposite direction (clicking an already sorted column)
    pub fn reversed(&self) -> Self {
        Self::new(self.field.clone(), self.direction.reverse())
    }
}

impl fmt::Display for DirectedSortingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_direction() {
        let field = DirectedSortingField::ascending("couponCode");
        let reversed = field.reversed();
        assert_eq!(reversed.direction, SortingDirection::Descending);
        assert_eq!(reversed.field.name(), "couponCode");
        assert_eq!(reversed.reversed(), field);
    }

    #[test]
    fn test_quoted_identifier() {
        assert_eq!(SortingField::new("coupon_code").quoted_identifier(), "\"coupon_code\"");
        assert_eq!(SortingField::new("o.status").quoted_identifier(), "\"o\".\"status\"");
        assert_eq!(
            SortingField::new("name\"; DROP TABLE orders; --").quoted_identifier(),
            "\"name\"\"; DROP TABLE orders; --\""
        );
    }

    #[test]
    fn test_display_as_order_by_fragment() {
        assert_eq!(DirectedSortingField::descending("status").to_string(), "status DESC");
    }
}
