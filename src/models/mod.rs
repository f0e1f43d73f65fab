use chrono::{DateTime, NaiveDateTime, Utc};

/// Declares a closed set of values stored as TEXT columns. Rows that fail
/// to parse fall back to the first variant with a warning.
macro_rules! text_enum {
    ($name:ident { $first:ident => $first_text:literal $(, $variant:ident => $text:literal)* $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            #[default]
            #[serde(rename = $first_text)]
            $first,
            $(
                #[serde(rename = $text)]
                $variant,
            )*
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$first => $first_text,
                    $($name::$variant => $text,)*
                }
            }

            pub(crate) fn parse_or_default(value: Option<&str>) -> Self {
                match value.map(str::parse::<Self>) {
                    Some(Ok(parsed)) => parsed,
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "Unreadable stored value, using default");
                        Self::default()
                    }
                    None => Self::default(),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $first_text => Ok($name::$first),
                    $($text => Ok($name::$variant),)*
                    _ => Err(anyhow::anyhow!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod beck;
pub mod content;
pub mod craving;
pub mod dashboard;
pub mod exercise;
pub mod session;
pub mod strategy;

pub use beck::*;
pub use content::*;
pub use craving::*;
pub use dashboard::*;
pub use exercise::*;
pub use session::*;
pub use strategy::*;

pub(crate) fn to_utc(dt: Option<NaiveDateTime>) -> DateTime<Utc> {
    dt.map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .unwrap_or_else(Utc::now)
}

/// List columns are stored as JSON arrays in TEXT.
pub(crate) fn parse_string_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}
