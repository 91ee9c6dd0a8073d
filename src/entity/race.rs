//! StarCraft II race codes used by race and team-race entity classes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Race {
    Protoss,
    Random,
    Terran,
    Zerg,
}

impl Race {
    /// Single-letter code
    pub fn code(self) -> char {
        match self {
            Race::Protoss => 'P',
            Race::Random => 'R',
            Race::Terran => 'T',
            Race::Zerg => 'Z',
        }
    }
}

impl FromStr for Race {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p" | "protoss" => Ok(Race::Protoss),
            "r" | "random" => Ok(Race::Random),
            "t" | "terran" => Ok(Race::Terran),
            "z" | "zerg" => Ok(Race::Zerg),
            other => Err(format!("Unknown race: {}", other)),
        }
    }
}

impl std::fmt::Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Canonical race composition of a side, e.g. `["zerg", "P"]` -> `"PZ"`
pub fn composition<S: AsRef<str>>(races: &[S]) -> Result<String, String> {
    let mut parsed = races
        .iter()
        .map(|r| r.as_ref().parse::<Race>())
        .collect::<Result<Vec<_>, _>>()?;
    parsed.sort();
    Ok(parsed.into_iter().map(Race::code).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!("Terran".parse::<Race>(), Ok(Race::Terran));
        assert_eq!("z".parse::<Race>(), Ok(Race::Zerg));
        assert_eq!(" PROTOSS ".parse::<Race>(), Ok(Race::Protoss));
        assert!("Kerrigan".parse::<Race>().is_err());
    }

    #[test]
    fn test_composition_is_order_independent() {
        assert_eq!(composition(&["Zerg", "Protoss"]).unwrap(), "PZ");
        assert_eq!(composition(&["P", "z"]).unwrap(), "PZ");
        assert_eq!(composition(&["T", "T"]).unwrap(), "TT");
        assert!(composition(&["T", "X"]).is_err());
    }
}
