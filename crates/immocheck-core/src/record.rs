use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// UnitKey
// ---------------------------------------------------------------------------

/// Composite lookup key for a housing unit.
///
/// Keys are compared exactly as entered: no whitespace or case
/// normalization, so "Appt 05" and "Appt 5" are distinct units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKey {
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    pub unit: String,
}

impl UnitKey {
    pub fn new(
        property: impl Into<String>,
        building: Option<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            building,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.building {
            Some(b) => write!(f, "{} / bat. {} / {}", self.property, b, self.unit),
            None => write!(f, "{} / {}", self.property, self.unit),
        }
    }
}

// ---------------------------------------------------------------------------
// DirectoryRecord
// ---------------------------------------------------------------------------

/// One row of the tenant directory. `occupant` is free text and may be
/// empty, which the form renders as "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    #[serde(flatten)]
    pub key: UnitKey,
    #[serde(default)]
    pub occupant: String,
}

impl DirectoryRecord {
    pub fn new(key: UnitKey, occupant: impl Into<String>) -> Self {
        Self {
            key,
            occupant: occupant.into(),
        }
    }

    /// Serialize to a four-cell sheet row: property, building, unit, occupant.
    /// An absent building becomes an empty cell.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.key.property.clone(),
            self.key.building.clone().unwrap_or_default(),
            self.key.unit.clone(),
            self.occupant.clone(),
        ]
    }

    /// Build a record from a sheet row. Rows shorter than four cells are
    /// padded with empty strings; an empty building cell maps to `None`.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let building = cell(1);
        Self {
            key: UnitKey {
                property: cell(0),
                building: if building.is_empty() {
                    None
                } else {
                    Some(building)
                },
                unit: cell(2),
            },
            occupant: cell(3),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trip() {
        let rec = DirectoryRecord::new(
            UnitKey::new("Canterane", Some("A".to_string()), "10"),
            "Jean",
        );
        let row = rec.to_row();
        assert_eq!(row, vec!["Canterane", "A", "10", "Jean"]);
        assert_eq!(DirectoryRecord::from_row(&row), rec);
    }

    #[test]
    fn missing_building_is_empty_cell() {
        let rec = DirectoryRecord::new(UnitKey::new("Les Glycines", None, "3"), "Sam");
        let row = rec.to_row();
        assert_eq!(row[1], "");
        assert_eq!(DirectoryRecord::from_row(&row).key.building, None);
    }

    #[test]
    fn short_row_is_padded() {
        let row = vec!["Canterane".to_string(), "B".to_string()];
        let rec = DirectoryRecord::from_row(&row);
        assert_eq!(rec.key.property, "Canterane");
        assert_eq!(rec.key.unit, "");
        assert_eq!(rec.occupant, "");
    }

    #[test]
    fn keys_are_not_normalized() {
        let a = UnitKey::new("Canterane", Some("A".to_string()), "Appt 05");
        let b = UnitKey::new("Canterane", Some("A".to_string()), "Appt 5");
        assert_ne!(a, b);
    }

    #[test]
    fn display_with_and_without_building() {
        let with = UnitKey::new("Canterane", Some("A".to_string()), "10");
        assert_eq!(with.to_string(), "Canterane / bat. A / 10");
        let without = UnitKey::new("Les Glycines", None, "3");
        assert_eq!(without.to_string(), "Les Glycines / 3");
    }
}
