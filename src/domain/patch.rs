use serde::de::{Deserialize, Deserializer};
use serde::Serialize;

/// Distinguishes "field omitted" from "field explicitly set to null" from
/// "field set to a value" for partial-update endpoints such as
/// `UpdateMapConfig`.
///
/// `Option<Option<T>>` can express the same three states but reads poorly
/// at call sites (`Some(None)` for "clear" is easy to misread as "unset").
/// `Patch<T>` names the three states directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was absent from the input: leave the stored value untouched.
    #[default]
    Omit,
    /// The key was present with a JSON `null`: clear the stored value.
    Clear,
    /// The key was present with a value: replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    #[must_use]
    pub const fn is_omit(&self) -> bool {
        matches!(self, Self::Omit)
    }

    /// Applies this patch to `current`, returning the new value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Omit => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Deserializing through `Option<T>` means this variant can only be
        // reached when the key was present (see `deserialize_patch_field`
        // below, which is what callers must use on the containing struct).
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}

/// Helper for `#[serde(default, deserialize_with = "deserialize_patch_field")]`
/// on a field of type `Patch<T>`: combined with `#[serde(default)]` (which
/// yields `Patch::Omit` when the key is entirely absent), this gives the
/// full three-state behavior through ordinary derive-based deserialization.
pub fn deserialize_patch_field<'de, D, T>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Patch::deserialize(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Input {
        #[serde(default, deserialize_with = "deserialize_patch_field")]
        grid_config: Patch<u32>,
    }

    #[test]
    fn omitted_key_is_omit() {
        let parsed: Input = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.grid_config, Patch::Omit);
    }

    #[test]
    fn explicit_null_is_clear() {
        let parsed: Input = serde_json::from_str(r#"{"grid_config": null}"#).unwrap();
        assert_eq!(parsed.grid_config, Patch::Clear);
    }

    #[test]
    fn explicit_value_is_set() {
        let parsed: Input = serde_json::from_str(r#"{"grid_config": 40}"#).unwrap();
        assert_eq!(parsed.grid_config, Patch::Set(40));
    }

    #[test]
    fn apply_respects_each_variant() {
        assert_eq!(Patch::Omit.apply(Some(1)), Some(1));
        assert_eq!(Patch::<u32>::Clear.apply(Some(1)), None);
        assert_eq!(Patch::Set(2).apply(Some(1)), Some(2));
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Omit | Self::Clear => serializer.serialize_none(),
            Self::Set(value) => serializer.serialize_some(value),
        }
    }
}
