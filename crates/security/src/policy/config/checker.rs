// Path: crates/security/src/policy/config/checker.rs
//! Checkers: bind the packet name to the signer's key-locator name.

use super::name_relation::NameRelation;
use super::parser::ConfigNode;
use crate::policy::extract_identity_from_key_locator;
use crate::regex::NdnRegex;
use ndn_types::error::ConfigError;
use ndn_types::{Name, SignatureType};

/// The key-locator constraint of a checker.
#[derive(Debug)]
enum KeyLocatorCheck {
    /// A fixed name under a relation, against the key-locator identity.
    NameRelation { name: Name, relation: NameRelation },
    /// A regex over the full key-locator name.
    Regex(NdnRegex),
    /// Packet and key-locator names are each matched and expanded, then
    /// compared under a relation.
    HyperRelation {
        packet_regex: NdnRegex,
        packet_expand: String,
        key_regex: NdnRegex,
        key_expand: String,
        relation: NameRelation,
    },
}

/// A checker: a signature-type requirement plus a key-locator constraint.
#[derive(Debug)]
pub struct Checker {
    sig_type: SignatureType,
    check: KeyLocatorCheck,
}

fn parse_sig_type(value: &str) -> Result<SignatureType, ConfigError> {
    match value {
        "rsa-sha256" => Ok(SignatureType::Sha256WithRsa),
        "ecdsa-sha256" => Ok(SignatureType::Sha256WithEcdsa),
        "hmac-sha256" => Ok(SignatureType::HmacWithSha256),
        "sha256" => Ok(SignatureType::DigestSha256),
        other => Err(ConfigError::Invalid(format!(
            "unknown sig-type `{other}`"
        ))),
    }
}

impl Checker {
    /// Builds a checker from a `checker` section.
    pub fn from_config(section: &ConfigNode) -> Result<Self, ConfigError> {
        match section.require("type")? {
            "customized" => {
                let sig_type = parse_sig_type(section.require("sig-type")?)?;
                let locator = section.child("key-locator").ok_or_else(|| {
                    ConfigError::Invalid("customized checker lacks `key-locator`".into())
                })?;
                let check = match locator.require("type")? {
                    "name" => {
                        if let Some(pattern) = locator.value_of("regex") {
                            KeyLocatorCheck::Regex(NdnRegex::new(pattern)?)
                        } else if locator.child("hyper-relation").is_some() {
                            let hyper = locator
                                .child("hyper-relation")
                                .ok_or_else(|| ConfigError::Invalid("missing hyper-relation".into()))?;
                            KeyLocatorCheck::HyperRelation {
                                packet_regex: NdnRegex::new(hyper.require("p-regex")?)?,
                                packet_expand: hyper.require("p-expand")?.to_string(),
                                key_regex: NdnRegex::new(hyper.require("k-regex")?)?,
                                key_expand: hyper.require("k-expand")?.to_string(),
                                relation: hyper.require("h-relation")?.parse()?,
                            }
                        } else {
                            KeyLocatorCheck::NameRelation {
                                name: locator
                                    .require("name")?
                                    .parse::<Name>()
                                    .map_err(|e| ConfigError::Invalid(format!("key-locator name: {e}")))?,
                                relation: locator.require("relation")?.parse()?,
                            }
                        }
                    }
                    other => {
                        return Err(ConfigError::Invalid(format!(
                            "unknown key-locator type `{other}`"
                        )))
                    }
                };
                Ok(Self { sig_type, check })
            }
            "hierarchical" => {
                let sig_type = parse_sig_type(section.require("sig-type")?)?;
                Ok(Self::hierarchical(sig_type))
            }
            other => Err(ConfigError::Invalid(format!(
                "unknown checker type `{other}`"
            ))),
        }
    }

    /// The hierarchical checker: the signer's identity must be a prefix
    /// of the packet name.
    pub fn hierarchical(sig_type: SignatureType) -> Self {
        Self {
            sig_type,
            check: KeyLocatorCheck::HyperRelation {
                // Sugar for the canonical hyper-relation.
                packet_regex: NdnRegex::new("^(<>+)$").expect("static pattern"),
                packet_expand: "\\1".into(),
                key_regex: NdnRegex::new("^(<>+)<KEY><>{1,3}$").expect("static pattern"),
                key_expand: "\\1".into(),
                relation: NameRelation::IsPrefixOf,
            },
        }
    }

    /// Checks the packet against the signer.
    ///
    /// Returns `Ok(())` when the binding holds; the error text names the
    /// failed condition.
    pub fn check(
        &self,
        packet_sig_type: SignatureType,
        packet_name: &Name,
        key_locator: &Name,
    ) -> Result<(), String> {
        if packet_sig_type != self.sig_type {
            return Err(format!(
                "signature type {packet_sig_type} does not match checker requirement {}",
                self.sig_type
            ));
        }
        match &self.check {
            KeyLocatorCheck::NameRelation { name, relation } => {
                let identity = extract_identity_from_key_locator(key_locator);
                if relation.check(name, &identity) {
                    Ok(())
                } else {
                    Err(format!(
                        "KeyLocator identity `{identity}` is not {relation} `{name}`"
                    ))
                }
            }
            KeyLocatorCheck::Regex(regex) => {
                if regex.matches(key_locator) {
                    Ok(())
                } else {
                    Err(format!(
                        "KeyLocator `{key_locator}` does not match `{}`",
                        regex.pattern()
                    ))
                }
            }
            KeyLocatorCheck::HyperRelation {
                packet_regex,
                packet_expand,
                key_regex,
                key_expand,
                relation,
            } => {
                let packet_match = packet_regex.match_name(packet_name).ok_or_else(|| {
                    format!(
                        "packet name `{packet_name}` does not match `{}`",
                        packet_regex.pattern()
                    )
                })?;
                let key_match = key_regex.match_name(key_locator).ok_or_else(|| {
                    format!(
                        "KeyLocator `{key_locator}` does not match `{}`",
                        key_regex.pattern()
                    )
                })?;
                let packet_derived = packet_match
                    .expand(packet_expand)
                    .map_err(|e| e.to_string())?;
                let key_derived = key_match.expand(key_expand).map_err(|e| e.to_string())?;
                if relation.check(&key_derived, &packet_derived) {
                    Ok(())
                } else {
                    Err(format!(
                        "derived key prefix `{key_derived}` is not {relation} derived packet prefix `{packet_derived}`"
                    ))
                }
            }
        }
    }
}
