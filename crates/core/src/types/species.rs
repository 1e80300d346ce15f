//! Pet species enumeration.

use serde::{Deserialize, Serialize};

/// The species of a pet listing.
///
/// Listings are constrained to this fixed set; anything outside it is
/// recorded as [`Species::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "species", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Fish,
    Rabbit,
    Hamster,
    Reptile,
    Other,
}

impl Species {
    /// All species, in display order.
    pub const ALL: [Self; 8] = [
        Self::Dog,
        Self::Cat,
        Self::Bird,
        Self::Fish,
        Self::Rabbit,
        Self::Hamster,
        Self::Reptile,
        Self::Other,
    ];
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dog => write!(f, "dog"),
            Self::Cat => write!(f, "cat"),
            Self::Bird => write!(f, "bird"),
            Self::Fish => write!(f, "fish"),
            Self::Rabbit => write!(f, "rabbit"),
            Self::Hamster => write!(f, "hamster"),
            Self::Reptile => write!(f, "reptile"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dog" => Ok(Self::Dog),
            "cat" => Ok(Self::Cat),
            "bird" => Ok(Self::Bird),
            "fish" => Ok(Self::Fish),
            "rabbit" => Ok(Self::Rabbit),
            "hamster" => Ok(Self::Hamster),
            "reptile" => Ok(Self::Reptile),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid species: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for species in Species::ALL {
            let parsed: Species = species.to_string().parse().unwrap();
            assert_eq!(parsed, species);
        }
    }

    #[test]
    fn test_unknown_species_rejected() {
        assert!("dinosaur".parse::<Species>().is_err());
    }
}
