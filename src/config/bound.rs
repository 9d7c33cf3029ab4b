//! Row bounds as found in mapping configurations: a concrete one-based row
//! number, a `${...}` expression not yet resolved, or nothing at all.
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A configured row bound.
///
/// `Literal` carries the one-based row number the configuration schema uses;
/// strategies convert to zero-based indices at extraction time. `Unresolved`
/// keeps the original expression text until the position resolver fixes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Bound {
    Literal(i64),
    Unresolved(String),
    #[default]
    Absent,
}

impl Bound {
    /// Classifies a raw configuration string: integers become `Literal`,
    /// anything else (typically a `${...}` expression) stays `Unresolved`.
    pub fn parse(text: &str) -> Bound {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Bound::Absent;
        }
        match trimmed.parse::<i64>() {
            Ok(value) => Bound::Literal(value),
            Err(_) => Bound::Unresolved(trimmed.to_owned()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Bound::Absent)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Bound::Unresolved(_))
    }

    pub fn literal(&self) -> Option<i64> {
        match self {
            Bound::Literal(value) => Some(*value),
            _ => None,
        }
    }

    /// The zero-based row index of a resolved bound, if it denotes a real row.
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Bound::Literal(value) if *value >= 1 => Some(*value as usize - 1),
            _ => None,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Literal(value) => write!(f, "{value}"),
            Bound::Unresolved(text) => f.write_str(text),
            Bound::Absent => Ok(()),
        }
    }
}

impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bound::Literal(value) => serializer.serialize_str(&value.to_string()),
            Bound::Unresolved(text) => serializer.serialize_str(text),
            Bound::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoundVisitor;

        impl<'de> Visitor<'de> for BoundVisitor {
            type Value = Bound;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a row number or expression string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Bound, E> {
                Ok(Bound::parse(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Bound, E> {
                Ok(Bound::Literal(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Bound, E> {
                Ok(Bound::Literal(value as i64))
            }

            fn visit_none<E: de::Error>(self) -> Result<Bound, E> {
                Ok(Bound::Absent)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Bound, E> {
                Ok(Bound::Absent)
            }
        }

        deserializer.deserialize_any(BoundVisitor)
    }
}
