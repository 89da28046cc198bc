// Path: crates/security/src/policy/config/mod.rs
//! The configuration-driven validation policy.
//!
//! A declarative document defines rules (filters + checkers) and trust
//! anchors. The policy matches a packet to the first applicable rule,
//! runs its checkers against the packet name and the signer's key-locator
//! name, and on success demands the signer's certificate. A `type any`
//! trust anchor puts the policy in bypass mode: everything is accepted
//! and no rules are evaluated.

pub mod checker;
pub mod filter;
pub mod name_relation;
pub mod parser;
pub mod rule;

pub use checker::Checker;
pub use filter::NameFilter;
pub use name_relation::NameRelation;
pub use rule::{Rule, RuleFor};

use super::{get_key_locator_name, get_signature_info, PolicyAction, ValidationPolicy};
use crate::io;
use crate::request::CertificateRequest;
use crate::state::ValidationState;
use ndn_types::error::{ConfigError, ValidationError, ValidationErrorCode};
use ndn_types::{Certificate, Data, Interest, Name, SignedInterestFormat};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A trust-anchor instruction produced by config parsing; the caller
/// installs it into the validator's anchor container.
#[derive(Debug)]
pub enum TrustAnchorDirective {
    /// Certificates loaded once (file or inline Base64).
    Certificates(Vec<Certificate>),
    /// A directory rescanned at the given cadence.
    Directory {
        /// Directory to scan.
        path: PathBuf,
        /// Rescan cadence; `None` scans once.
        refresh: Option<Duration>,
    },
    /// Bypass mode: accept everything.
    Any,
}

/// The outcome of parsing a validator configuration document.
#[derive(Debug)]
pub struct ParsedConfig {
    /// Rules applying to Data packets.
    pub data_rules: Vec<Rule>,
    /// Rules applying to signed Interests.
    pub interest_rules: Vec<Rule>,
    /// Trust anchor instructions.
    pub anchors: Vec<TrustAnchorDirective>,
    /// True when a `type any` anchor was present.
    pub bypass: bool,
}

fn parse_refresh(value: &str) -> Result<Duration, ConfigError> {
    let error = || ConfigError::Invalid(format!("invalid refresh `{value}`"));
    let (digits, unit) = match value.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((split, _)) => value.split_at(split),
        None => (value, "s"),
    };
    let count: u64 = digits.parse().map_err(|_| error())?;
    match unit {
        "h" => Ok(Duration::from_secs(count * 3600)),
        "m" => Ok(Duration::from_secs(count * 60)),
        "s" | "" => Ok(Duration::from_secs(count)),
        _ => Err(error()),
    }
}

/// Parses a configuration document. Relative anchor paths are resolved
/// against `config_dir`; `type file` anchors are loaded immediately.
pub fn parse_config(text: &str, config_dir: &Path) -> Result<ParsedConfig, ConfigError> {
    let nodes = parser::parse_document(text)?;
    let mut config = ParsedConfig {
        data_rules: Vec::new(),
        interest_rules: Vec::new(),
        anchors: Vec::new(),
        bypass: false,
    };
    for node in &nodes {
        match node.key.as_str() {
            "rule" => {
                let rule = Rule::from_config(node)?;
                match rule.packet_kind {
                    RuleFor::Data => config.data_rules.push(rule),
                    RuleFor::Interest => config.interest_rules.push(rule),
                }
            }
            "trust-anchor" => match node.require("type")? {
                "file" => {
                    let file = node.require("file-name")?;
                    let path = config_dir.join(file);
                    config.anchors.push(TrustAnchorDirective::Certificates(vec![
                        io::load_certificate(&path)?,
                    ]));
                }
                "base64" => {
                    let text = node.require("base64-string")?;
                    config.anchors.push(TrustAnchorDirective::Certificates(vec![
                        io::decode_certificate_base64(text.as_bytes())?,
                    ]));
                }
                "dir" => {
                    let dir = node.require("dir")?;
                    let refresh = node.value_of("refresh").map(parse_refresh).transpose()?;
                    config.anchors.push(TrustAnchorDirective::Directory {
                        path: config_dir.join(dir),
                        refresh,
                    });
                }
                "any" => {
                    config.bypass = true;
                    config.anchors.push(TrustAnchorDirective::Any);
                }
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "unknown trust-anchor type `{other}`"
                    )))
                }
            },
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown top-level section `{other}`"
                )))
            }
        }
    }
    Ok(config)
}

struct ConfigState {
    bypass: bool,
    data_rules: Vec<Rule>,
    interest_rules: Vec<Rule>,
}

/// The configuration-driven policy. Clones share the loaded rule set, so
/// a handle kept outside the validator can reload it.
#[derive(Clone)]
pub struct ConfigPolicy {
    state: Arc<Mutex<ConfigState>>,
}

impl Default for ConfigPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPolicy {
    /// Creates an empty policy that rejects every packet until loaded.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ConfigState {
                bypass: false,
                data_rules: Vec::new(),
                interest_rules: Vec::new(),
            })),
        }
    }

    /// Installs the rules of a parsed configuration, replacing any
    /// previous load.
    pub fn install(&self, config: &mut ParsedConfig) {
        if let Ok(mut state) = self.state.lock() {
            state.bypass = config.bypass;
            state.data_rules = std::mem::take(&mut config.data_rules);
            state.interest_rules = std::mem::take(&mut config.interest_rules);
        }
    }

    fn is_bypass(&self) -> bool {
        self.state.lock().map(|state| state.bypass).unwrap_or(false)
    }

    fn check(
        &self,
        kind: RuleFor,
        packet_name: &Name,
        sig_info: &ndn_types::SignatureInfo,
    ) -> Result<PolicyAction, ValidationError> {
        let Ok(state) = self.state.lock() else {
            return Err(ValidationError::new(
                ValidationErrorCode::ImplementationError,
                "config policy state poisoned",
            ));
        };
        if state.bypass {
            return Ok(None);
        }
        let key_locator = get_key_locator_name(sig_info, packet_name)?;
        let rules = match kind {
            RuleFor::Data => &state.data_rules,
            RuleFor::Interest => &state.interest_rules,
        };
        let rule = rules.iter().find(|rule| rule.matches(packet_name)).ok_or_else(|| {
            ValidationError::new(
                ValidationErrorCode::PolicyError,
                format!("no rule matched `{packet_name}`"),
            )
            .with_name(packet_name.clone())
        })?;
        rule.check(sig_info.sig_type(), packet_name, &key_locator)
            .map_err(|message| {
                ValidationError::new(
                    ValidationErrorCode::PolicyError,
                    format!("rule `{}`: {message}", rule.id),
                )
                .with_name(packet_name.clone())
            })?;
        Ok(Some(CertificateRequest::new(key_locator)))
    }
}

impl ValidationPolicy for ConfigPolicy {
    fn check_data(
        &self,
        data: &Data,
        _state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        if self.is_bypass() {
            return Ok(None);
        }
        let info = data.signature_info().ok_or_else(|| {
            ValidationError::new(
                ValidationErrorCode::MalformedSignature,
                format!("`{}` is not signed", data.name()),
            )
        })?;
        self.check(RuleFor::Data, data.name(), info)
    }

    fn check_interest(
        &self,
        interest: &Interest,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        if self.is_bypass() {
            return Ok(None);
        }
        let info = get_signature_info(interest, state)?;
        // Legacy command Interests carry their signature in the last four
        // name components; rules see the name without them.
        let packet_name = match state.format_tag() {
            Some(SignedInterestFormat::V02) => interest.name().get_prefix(-4),
            _ => interest.name().clone(),
        };
        self.check(RuleFor::Interest, &packet_name, &info)
    }

    fn check_certificate(
        &self,
        certificate: &Certificate,
        state: &mut ValidationState,
    ) -> Result<PolicyAction, ValidationError> {
        self.check_data(certificate.as_data(), state)
    }
}
