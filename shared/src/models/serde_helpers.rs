//! Common serde helpers for request payloads

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (even `null`) as `Some(value)`
///
/// Paired with `#[serde(default)]` on an `Option<Option<T>>` field this keeps
/// "field absent" (`None`) apart from "field set to null" (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize bool that treats null as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}
