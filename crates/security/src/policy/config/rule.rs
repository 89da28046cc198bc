// Path: crates/security/src/policy/config/rule.rs
//! A rule: packet kind, name filters, and checkers.

use super::checker::Checker;
use super::filter::NameFilter;
use super::parser::ConfigNode;
use ndn_types::error::ConfigError;
use ndn_types::{Name, SignatureType};

/// Which packet kind a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFor {
    /// Data packets (and certificates).
    Data,
    /// Signed Interests.
    Interest,
}

/// One `rule` section.
#[derive(Debug)]
pub struct Rule {
    /// Human-readable rule id, used in error messages.
    pub id: String,
    /// The packet kind this rule covers.
    pub packet_kind: RuleFor,
    filters: Vec<NameFilter>,
    checkers: Vec<Checker>,
}

impl Rule {
    /// Builds a rule from a `rule` section.
    pub fn from_config(section: &ConfigNode) -> Result<Self, ConfigError> {
        let id = section.require("id")?.to_string();
        let packet_kind = match section.require("for")? {
            "data" => RuleFor::Data,
            "interest" => RuleFor::Interest,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "rule `{id}`: unknown packet kind `{other}`"
                )))
            }
        };
        let mut filters = Vec::new();
        for filter in section.children_named("filter") {
            filters.push(NameFilter::from_config(filter)?);
        }
        let mut checkers = Vec::new();
        for checker in section.children_named("checker") {
            checkers.push(Checker::from_config(checker)?);
        }
        if checkers.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "rule `{id}` has no checker"
            )));
        }
        Ok(Self {
            id,
            packet_kind,
            filters,
            checkers,
        })
    }

    /// True when this rule applies to the packet name: no filters, or any
    /// filter passes.
    pub fn matches(&self, packet_name: &Name) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f.matches(packet_name))
    }

    /// Runs the checkers; the rule passes when any checker accepts.
    pub fn check(
        &self,
        packet_sig_type: SignatureType,
        packet_name: &Name,
        key_locator: &Name,
    ) -> Result<(), String> {
        let mut last_error = format!("rule `{}` has no applicable checker", self.id);
        for checker in &self.checkers {
            match checker.check(packet_sig_type, packet_name, key_locator) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::config::parser::parse_document;

    fn rule_from(text: &str) -> Rule {
        let nodes = parse_document(text).unwrap();
        Rule::from_config(&nodes[0]).unwrap()
    }

    #[test]
    fn rule_matching_and_checking() {
        let rule = rule_from(
            "rule { id test for data \
             filter { type name name /app relation is-prefix-of } \
             checker { type hierarchical sig-type ecdsa-sha256 } }",
        );
        assert_eq!(rule.packet_kind, RuleFor::Data);
        assert!(rule.matches(&Name::from_uri("/app/data").unwrap()));
        assert!(!rule.matches(&Name::from_uri("/other").unwrap()));

        assert!(rule
            .check(
                SignatureType::Sha256WithEcdsa,
                &Name::from_uri("/app/data").unwrap(),
                &Name::from_uri("/app/KEY/%01").unwrap(),
            )
            .is_ok());
        assert!(rule
            .check(
                SignatureType::Sha256WithEcdsa,
                &Name::from_uri("/app/data").unwrap(),
                &Name::from_uri("/evil/KEY/%01").unwrap(),
            )
            .is_err());
    }

    #[test]
    fn rule_without_checker_is_invalid() {
        let nodes = parse_document("rule { id broken for data }").unwrap();
        assert!(Rule::from_config(&nodes[0]).is_err());
    }

    #[test]
    fn filterless_rule_matches_everything() {
        let rule = rule_from(
            "rule { id all for interest \
             checker { type hierarchical sig-type ecdsa-sha256 } }",
        );
        assert!(rule.matches(&Name::from_uri("/any/name").unwrap()));
    }
}
