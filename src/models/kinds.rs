use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Raised when a wire string names no variant of a closed enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Closed string enum with a fixed wire spelling per variant.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $label, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// Roast level of a bean batch
    RoastLevel, "roast level" {
        Light => "LIGHT",
        MediumLight => "MEDIUM_LIGHT",
        Medium => "MEDIUM",
        MediumDark => "MEDIUM_DARK",
        Dark => "DARK",
    }
}

string_enum! {
    /// Grind setting for a recipe
    GrindSize, "grind size" {
        ExtraFine => "EXTRA_FINE",
        Fine => "FINE",
        MediumFine => "MEDIUM_FINE",
        Medium => "MEDIUM",
        MediumCoarse => "MEDIUM_COARSE",
        Coarse => "COARSE",
    }
}

string_enum! {
    /// Brewer a recipe is written for
    Equipment, "equipment" {
        V60 => "V60",
        KalitaWave => "KALITA_WAVE",
        Chemex => "CHEMEX",
        Aeropress => "AEROPRESS",
        FrenchPress => "FRENCH_PRESS",
        Clever => "CLEVER",
        Other => "OTHER",
    }
}

string_enum! {
    /// Tasting dimension scored in a brew log
    TasteAspect, "taste aspect" {
        Acidity => "acidity",
        Bitterness => "bitterness",
        Sweetness => "sweetness",
        Body => "body",
        Aftertaste => "aftertaste",
    }
}

/// Deserialize an optional value from a string where `null` and `""` both mean absent.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(de::Error::custom),
    }
}
