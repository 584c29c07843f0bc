use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Declares a UUID v7 identifier newtype with string (de)serialization.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh time-ordered identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::try_parse(s.trim()).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let text = Cow::<'de, str>::deserialize(d)?;
                text.parse().map_err(D::Error::custom)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a task.
    TaskId
);

uuid_id!(
    /// Identifier of a category.
    CategoryId
);

impl TaskId {
    /// Short prefix shown in listings.
    #[must_use]
    pub fn short(&self) -> String {
        let mut hex = self.0.simple().to_string();
        hex.truncate(8);
        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_v7_and_distinct() {
        let first = TaskId::new();
        let second = TaskId::new();
        assert_eq!(first.0.get_version_num(), 7);
        assert_eq!(CategoryId::new().0.get_version_num(), 7);
        assert_ne!(first, second);
    }

    #[test]
    fn parses_display_form_with_surrounding_space() {
        let uuid = Uuid::now_v7();
        let parsed: TaskId = format!(" {uuid} ")
            .parse()
            .unwrap_or_else(|err| panic!("must parse task id: {err}"));
        assert_eq!(parsed.0, uuid);
        assert!("not-a-uuid".parse::<CategoryId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = TaskId::from_str("019a6ff3-119f-7661-869e-2a6c4fca5c4f")
            .unwrap_or_else(|err| panic!("must parse task id: {err}"));
        let json = serde_json::to_string(&id).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(json, "\"019a6ff3-119f-7661-869e-2a6c4fca5c4f\"");
        let back: TaskId =
            serde_json::from_str(&json).unwrap_or_else(|err| panic!("deserialize: {err}"));
        assert_eq!(back, id);
    }

    #[test]
    fn short_form_is_eight_hex_chars() {
        let id = TaskId::from_str("019a6ff3-119f-7661-869e-2a6c4fca5c4f")
            .unwrap_or_else(|err| panic!("must parse task id: {err}"));
        assert_eq!(id.short(), "019a6ff3");
    }
}
