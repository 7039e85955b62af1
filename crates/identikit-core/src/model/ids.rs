use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        /// Parses the decimal form scrapers use for stored identifiers.
        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_id!(SceneId, "Unique identifier for a scene.");
define_id!(GalleryId, "Unique identifier for an image gallery.");
define_id!(PerformerId, "Unique identifier for a performer.");
define_id!(TagId, "Unique identifier for a tag.");
define_id!(StudioId, "Unique identifier for a studio.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stored_id() {
        let id: PerformerId = "42".parse().unwrap();
        assert_eq!(id, PerformerId::new(42));
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let id: TagId = " 7 ".parse().unwrap();
        assert_eq!(id, TagId::new(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("invalidStoredID".parse::<StudioId>().is_err());
        assert!("".parse::<TagId>().is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(SceneId::new(12).to_string(), "12");
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&GalleryId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
