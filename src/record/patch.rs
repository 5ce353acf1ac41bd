//! Presence-aware fields for partial updates.

use serde::{Deserialize, Deserializer};

use crate::Error;

/// One field of a partial update payload.
///
/// JSON cannot be overlaid onto a record without losing the difference
/// between a key that was left out and a key that was set to `null`, so each
/// field records which of the two happened. Fields must be marked with
/// `#[serde(default)]` so that an absent key becomes [Patch::Missing].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not present; the field keeps its current value.
    Missing,
    /// The key was present with the value `null`; the field is cleared.
    Null,
    /// The key was present with a value; the field is set to it.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    /// Transform the value, if any, with a fallible function.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U, Error>) -> Result<Patch<U>, Error> {
        Ok(match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(f(value)?),
        })
    }

    /// Overlay the patch onto a field that must always have a value.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the patch tries to clear the field.
    pub fn apply_required(self, field_name: &str, field: &mut T) -> Result<(), Error> {
        match self {
            Patch::Missing => Ok(()),
            Patch::Null => Err(Error::Validation(format!("{field_name} cannot be null"))),
            Patch::Value(value) => {
                *field = value;
                Ok(())
            }
        }
    }

    /// Overlay the patch onto an optional field.
    pub fn apply_optional(self, field: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *field = None,
            Patch::Value(value) => *field = Some(value),
        }
    }
}
