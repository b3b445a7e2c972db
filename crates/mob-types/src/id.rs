use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Normalized identifier for any listing, user-submitted or catalog.
///
/// Persisted favorites may hold ids as JSON numbers or as numeric strings,
/// and catalog data is not consistent either. A `ListingId` is parsed once at
/// the boundary so that `7`, `7.0` and `"7"` all compare equal afterwards.
/// It always serializes as a JSON number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingId(u64);

impl ListingId {
    /// Create an id from a raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The next id after this one.
    pub fn successor(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    fn from_f64(v: f64) -> Option<Self> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Some(Self(v as u64))
        } else {
            None
        }
    }
}

impl fmt::Debug for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListingId({})", self.0)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ListingId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ListingId> for u64 {
    fn from(id: ListingId) -> Self {
        id.0
    }
}

impl FromStr for ListingId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(raw) = trimmed.parse::<u64>() {
            return Ok(Self(raw));
        }
        // "7.0" and "1.7e12" show up when ids went through a float round-trip.
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or_else(|| TypeError::InvalidListingId(s.to_string()))
    }
}

impl Serialize for ListingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ListingIdVisitor)
    }
}

struct ListingIdVisitor;

impl<'de> Visitor<'de> for ListingIdVisitor {
    type Value = ListingId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ListingId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(ListingId)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        ListingId::from_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_and_numeric_strings_alike() {
        let a: ListingId = serde_json::from_value(json!(7)).unwrap();
        let b: ListingId = serde_json::from_value(json!("7")).unwrap();
        let c: ListingId = serde_json::from_value(json!(7.0)).unwrap();
        let d: ListingId = serde_json::from_value(json!(" 7 ")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    fn always_serializes_as_number() {
        let id: ListingId = serde_json::from_value(json!("1718000000000")).unwrap();
        assert_eq!(serde_json::to_value(id).unwrap(), json!(1_718_000_000_000u64));
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(serde_json::from_value::<ListingId>(json!("loft")).is_err());
        assert!(serde_json::from_value::<ListingId>(json!(-3)).is_err());
        assert!(serde_json::from_value::<ListingId>(json!(2.5)).is_err());
        assert!(serde_json::from_value::<ListingId>(json!(null)).is_err());
        assert!(serde_json::from_value::<ListingId>(json!(true)).is_err());
    }

    #[test]
    fn from_str_reports_original_input() {
        let err = "abc".parse::<ListingId>().unwrap_err();
        assert_eq!(err, TypeError::InvalidListingId("abc".into()));
    }

    #[test]
    fn successor_saturates() {
        assert_eq!(ListingId::new(1).successor(), ListingId::new(2));
        assert_eq!(ListingId::new(u64::MAX).successor(), ListingId::new(u64::MAX));
    }

    proptest! {
        #[test]
        fn string_and_number_forms_normalize_equal(raw in 0u64..(1u64 << 53)) {
            let from_num: ListingId = serde_json::from_value(json!(raw)).unwrap();
            let from_str: ListingId = serde_json::from_value(json!(raw.to_string())).unwrap();
            prop_assert_eq!(from_num, from_str);
            prop_assert_eq!(from_num.get(), raw);
        }
    }
}
