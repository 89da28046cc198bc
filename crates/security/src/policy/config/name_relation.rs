// Path: crates/security/src/policy/config/name_relation.rs
//! Name relations used by filters and checkers.

use ndn_types::error::ConfigError;
use ndn_types::Name;
use std::str::FromStr;

/// A binary relation between two names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRelation {
    /// The names are equal.
    Equal,
    /// The first name is a prefix of (or equal to) the second.
    IsPrefixOf,
    /// The first name is a strict prefix of the second.
    IsStrictPrefixOf,
}

impl NameRelation {
    /// Tests `first relation second`.
    pub fn check(&self, first: &Name, second: &Name) -> bool {
        match self {
            Self::Equal => first == second,
            Self::IsPrefixOf => first.is_prefix_of(second),
            Self::IsStrictPrefixOf => first.is_prefix_of(second) && first.len() < second.len(),
        }
    }
}

impl std::fmt::Display for NameRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Equal => "equal",
            Self::IsPrefixOf => "is-prefix-of",
            Self::IsStrictPrefixOf => "is-strict-prefix-of",
        })
    }
}

impl FromStr for NameRelation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(Self::Equal),
            "is-prefix-of" => Ok(Self::IsPrefixOf),
            "is-strict-prefix-of" => Ok(Self::IsStrictPrefixOf),
            other => Err(ConfigError::Invalid(format!("unknown relation `{other}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relations() {
        let a = Name::from_uri("/a").unwrap();
        let ab = Name::from_uri("/a/b").unwrap();
        assert!(NameRelation::Equal.check(&a, &a));
        assert!(!NameRelation::Equal.check(&a, &ab));
        assert!(NameRelation::IsPrefixOf.check(&a, &ab));
        assert!(NameRelation::IsPrefixOf.check(&a, &a));
        assert!(NameRelation::IsStrictPrefixOf.check(&a, &ab));
        assert!(!NameRelation::IsStrictPrefixOf.check(&a, &a));
    }

    #[test]
    fn parse() {
        assert_eq!(
            "is-prefix-of".parse::<NameRelation>().unwrap(),
            NameRelation::IsPrefixOf
        );
        assert!("sibling-of".parse::<NameRelation>().is_err());
    }
}
