//! Rental unit identifiers.
//!
//! The booking sheet labels units loosely: `2`, `"2"`, `"Cabaña 2"` and
//! `"Cabana 2"` all name the same cabin. [`UnitId`] reduces a label to the
//! first run of decimal digits, falling back to the trimmed label when there
//! are none, and compares the result as a plain string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::booking::string_or_number;

/// A normalized unit identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(String);

impl UnitId {
    /// Normalize a free-form unit label.
    pub fn normalize(label: &str) -> Self {
        let trimmed = label.trim();
        let digits: String = trimmed
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        if digits.is_empty() {
            UnitId(trimmed.to_string())
        } else {
            UnitId(digits)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(label: &str) -> Self {
        UnitId::normalize(label)
    }
}

impl From<u32> for UnitId {
    fn from(n: u32) -> Self {
        UnitId(n.to_string())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = string_or_number(deserializer)?;
        Ok(UnitId::normalize(&raw))
    }
}
