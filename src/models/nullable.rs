//! Serde helper for fields the store may send as `null`.

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as the field's default value.
///
/// Pair with `#[serde(default)]` so a missing field defaults too.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
