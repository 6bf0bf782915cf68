//! Serde support for "present but null" fields in partial updates.
//!
//! A partial update needs three states per nullable column: absent (leave the
//! column alone), `null` (clear it) and a value (set it). These are modelled as
//! `Option<Option<T>>`, where the outer `None` means absent.

use serde::{Deserialize, Deserializer};

/// Deserialize any present value (including `null`) into `Some(..)`.
///
/// Pair with `#[serde(default)]` so that absent fields stay `None`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        location: Option<Option<String>>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.location, None);

        let cleared: Patch = serde_json::from_str(r#"{"location": null}"#).unwrap();
        assert_eq!(cleared.location, Some(None));

        let set: Patch = serde_json::from_str(r#"{"location": "Haneda T3"}"#).unwrap();
        assert_eq!(set.location, Some(Some("Haneda T3".to_string())));
    }
}
