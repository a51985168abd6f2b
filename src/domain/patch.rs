//! Tri-state fields for partial updates
//!
//! An update payload only touches the fields it mentions. [`Patch`] makes
//! the three cases explicit instead of probing an untyped map for keys:
//!
//! | JSON | Patch |
//! |------|-------|
//! | key absent | [`Patch::Unset`] |
//! | `"key": null` | [`Patch::SetNull`] |
//! | `"key": value` | [`Patch::Set`] |
//!
//! Struct fields must carry `#[serde(default)]` so that an absent key
//! deserializes to `Unset`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A malformed update payload
#[derive(Debug, Error)]
#[error("Invalid update payload: {0}")]
pub struct PatchError(#[from] serde_json::Error);

/// Parses a JSON update body into a patch struct
pub fn from_json<T: DeserializeOwned>(payload: &str) -> Result<T, PatchError> {
    Ok(serde_json::from_str(payload)?)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the stored value alone
    #[default]
    Unset,
    /// Replace the stored value
    Set(T),
    /// Clear the stored value
    SetNull,
}

impl<T> Patch<T> {
    /// Builds a patch from a command-line value and its `--clear-*` flag
    ///
    /// A clear flag wins over a value given at the same time.
    pub fn from_cli(value: Option<T>, clear: bool) -> Self {
        match (value, clear) {
            (_, true) => Patch::SetNull,
            (Some(v), false) => Patch::Set(v),
            (None, false) => Patch::Unset,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    /// Returns true if the field was mentioned at all
    pub fn is_present(&self) -> bool {
        !self.is_unset()
    }

    /// Returns the new value if one was set
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Set(v) => Patch::Set(v),
            Patch::SetNull => Patch::SetNull,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Set(v) => Patch::Set(f(v)),
            Patch::SetNull => Patch::SetNull,
        }
    }

    /// Fallible [`Patch::map`]
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Unset => Patch::Unset,
            Patch::Set(v) => Patch::Set(f(v)?),
            Patch::SetNull => Patch::SetNull,
        })
    }

    /// Applies the patch to a nullable stored value
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Unset => current,
            Patch::Set(v) => Some(v),
            Patch::SetNull => None,
        }
    }

    /// Applies the patch to a non-nullable stored value; `SetNull` keeps it
    pub fn apply_required(self, current: T) -> T {
        match self {
            Patch::Set(v) => v,
            Patch::Unset | Patch::SetNull => current,
        }
    }
}

impl Patch<String> {
    /// Treats `Set("")` (after trimming) like `SetNull`
    ///
    /// Form fields submit empty strings for cleared inputs.
    pub fn blank_as_null(self) -> Self {
        match self {
            Patch::Set(v) if v.trim().is_empty() => Patch::SetNull,
            other => other,
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
        // Only called when the key is present; absent keys fall back to Default
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Set(v),
            None => Patch::SetNull,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        memo: Patch<String>,
        #[serde(default)]
        count: Patch<u32>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let body: Body = serde_json::from_str(r#"{"memo": null}"#).unwrap();
        assert_eq!(body.memo, Patch::SetNull);
        assert_eq!(body.count, Patch::Unset);

        let body: Body = serde_json::from_str(r#"{"memo": "late", "count": 3}"#).unwrap();
        assert_eq!(body.memo, Patch::Set("late".to_string()));
        assert_eq!(body.count, Patch::Set(3));
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(serde_json::from_str::<Body>(r#"{"count": "three"}"#).is_err());
    }

    #[test]
    fn from_json_reports_payload_errors() {
        let err = from_json::<Body>("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Invalid update payload"));
    }

    #[test]
    fn from_cli_prefers_clear() {
        assert_eq!(Patch::from_cli(Some(1), true), Patch::<i32>::SetNull);
        assert_eq!(Patch::from_cli(Some(1), false), Patch::Set(1));
        assert_eq!(Patch::<i32>::from_cli(None, false), Patch::Unset);
    }

    #[test]
    fn apply_semantics() {
        assert_eq!(Patch::Unset.apply(Some(1)), Some(1));
        assert_eq!(Patch::Set(2).apply(Some(1)), Some(2));
        assert_eq!(Patch::SetNull.apply(Some(1)), None);
        assert_eq!(Patch::SetNull.apply_required(1), 1);
        assert_eq!(Patch::Set(2).apply_required(1), 2);
    }

    #[test]
    fn blank_strings_clear() {
        assert_eq!(Patch::Set("  ".to_string()).blank_as_null(), Patch::SetNull);
        assert_eq!(
            Patch::Set("x".to_string()).blank_as_null(),
            Patch::Set("x".to_string())
        );
    }
}
