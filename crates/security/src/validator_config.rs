// Path: crates/security/src/validator_config.rs
//! The preassembled configuration-driven validator: the signed-Interest
//! guard wrapping the command-Interest guard wrapping the config policy.

use crate::fetcher::CertificateFetcher;
use crate::policy::config::{parse_config, ConfigPolicy, TrustAnchorDirective};
use crate::policy::{CommandInterestPolicy, SignedInterestPolicy};
use crate::validator::Validator;
use ndn_api::time::{Clock, SystemClock};
use ndn_types::error::{ConfigError, ValidationError};
use ndn_types::{Data, Interest};
use std::path::Path;
use std::sync::Arc;

/// A validator whose policy is loaded from a declarative configuration
/// document.
pub struct ValidatorConfig {
    validator: Validator,
    config: ConfigPolicy,
}

impl ValidatorConfig {
    /// Assembles the policy chain over `fetcher` with the system clock.
    pub fn new(fetcher: Box<dyn CertificateFetcher>) -> Self {
        Self::with_clock(fetcher, Arc::new(SystemClock))
    }

    /// Assembles the policy chain over `fetcher` with an explicit clock.
    pub fn with_clock(fetcher: Box<dyn CertificateFetcher>, clock: Arc<dyn Clock>) -> Self {
        let config = ConfigPolicy::new();
        let command_guard = CommandInterestPolicy::with_clock(
            Box::new(config.clone()),
            Default::default(),
            Arc::clone(&clock),
        );
        let signed_guard = SignedInterestPolicy::with_clock(
            Box::new(command_guard),
            Default::default(),
            Arc::clone(&clock),
        );
        Self {
            validator: Validator::with_clock(Box::new(signed_guard), fetcher, clock),
            config,
        }
    }

    /// Loads a configuration document; relative anchor paths resolve
    /// against `config_dir`. Replaces previously loaded rules and adds
    /// the document's trust anchors.
    pub fn load_str(&self, text: &str, config_dir: &Path) -> Result<(), ConfigError> {
        let mut parsed = parse_config(text, config_dir)?;
        for anchor in parsed.anchors.drain(..) {
            match anchor {
                TrustAnchorDirective::Certificates(certificates) => {
                    for certificate in certificates {
                        self.validator.load_anchor(certificate);
                    }
                }
                TrustAnchorDirective::Directory { path, refresh } => {
                    self.validator.load_anchor_dir(path, refresh);
                }
                TrustAnchorDirective::Any => {}
            }
        }
        self.config.install(&mut parsed);
        Ok(())
    }

    /// Loads a configuration file; anchors resolve against its directory.
    pub fn load_file(&self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::AnchorLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let dir = path.parent().unwrap_or(Path::new("."));
        self.load_str(&text, dir)
    }

    /// The underlying validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Mutable access, e.g. to adjust the depth limit.
    pub fn validator_mut(&mut self) -> &mut Validator {
        &mut self.validator
    }

    /// Validates a Data packet.
    pub async fn validate_data(&self, data: &Data) -> Result<(), ValidationError> {
        self.validator.validate_data(data).await
    }

    /// Validates a (signed) Interest.
    pub async fn validate_interest(&self, interest: &Interest) -> Result<(), ValidationError> {
        self.validator.validate_interest(interest).await
    }
}
