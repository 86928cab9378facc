//! Domain models for the palliative-rx system.

use chrono::{DateTime, SecondsFormat, Utc};

/// Declares a closed set of upper-case string values stored as TEXT and
/// exchanged as JSON strings.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::validation::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(crate::validation::ValidationError::Invalid(format!(
                        "Invalid {}. Must be one of: {}",
                        $label,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

mod adherence;
mod medicine;
mod notification;
mod prescription;
mod profile;
mod restock;
mod user;

pub use adherence::*;
pub use medicine::*;
pub use notification::*;
pub use prescription::*;
pub use profile::*;
pub use restock::*;
pub use user::*;

/// Stored timestamp form: RFC 3339, UTC, whole seconds, `Z` suffix.
/// Lexical order of these strings is chronological order.
pub fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time in stored form.
pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

/// Fresh primary key.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
