// Path: crates/test-utils/src/keychain.rs
//! An in-memory key chain for tests.
//!
//! Stands in for the persistent key-chain collaborator: it mints EC keys
//! under identities, issues certificates (self-signed or cross-signed),
//! and signs Data and Interests in both signed-Interest formats.

use chrono::Duration as ChronoDuration;
use ndn_api::crypto::KeyType;
use ndn_api::security::{KeyChain, SignerType, SigningInfo};
use ndn_api::time::{Clock, SystemClock};
use ndn_crypto::verification;
use ndn_crypto::{generate_private_key, KeyParams, PrivateKey};
use ndn_types::error::CryptoError;
use ndn_types::tlv::content_type;
use ndn_types::{
    Certificate, Component, Data, Interest, KeyLocator, Name, SignatureInfo, SignedInterestFormat,
    ValidityPeriod,
};
use rand::RngCore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct KeyEntry {
    key_name: Name,
    private: PrivateKey,
    certificate: Option<Certificate>,
    next_seq_num: u64,
}

struct Inner {
    keys: Vec<KeyEntry>,
    default_identity: Option<Name>,
}

/// An in-memory signing collaborator.
pub struct MemoryKeyChain {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
}

fn random_component() -> Component {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Component::generic(bytes.to_vec())
}

fn random_nonce() -> Vec<u8> {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.to_vec()
}

impl MemoryKeyChain {
    /// Creates an empty key chain using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty key chain with an explicit clock; signing
    /// timestamps and certificate validity windows follow it.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                keys: Vec::new(),
                default_identity: None,
            }),
            clock,
        }
    }

    /// Generates a fresh EC key under `identity`, returning the key name.
    pub fn create_key(&self, identity: &Name) -> Result<Name, CryptoError> {
        let private = generate_private_key(&KeyParams::Ec { bits: 256 })?;
        let key_name = identity
            .clone()
            .append_str("KEY")
            .append(random_component());
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| CryptoError::Io("key chain poisoned".into()))?;
        inner.keys.push(KeyEntry {
            key_name: key_name.clone(),
            private,
            certificate: None,
            next_seq_num: 0,
        });
        if inner.default_identity.is_none() {
            inner.default_identity = Some(identity.clone());
        }
        Ok(key_name)
    }

    /// Creates an identity with a fresh key and a self-signed certificate.
    pub fn create_identity(&self, identity: &Name) -> Result<Certificate, CryptoError> {
        let key_name = self.create_key(identity)?;
        self.issue_certificate(&key_name, &key_name, "self")
    }

    /// Issues a certificate for `subject_key`, signed by `issuer_key`,
    /// and records it as the subject's certificate.
    pub fn issue_certificate(
        &self,
        subject_key: &Name,
        issuer_key: &Name,
        issuer_id: &str,
    ) -> Result<Certificate, CryptoError> {
        let now = self.clock.system_now();
        let version = now.timestamp_millis().max(0) as u64;
        let (subject_spki, issuer_private) = {
            let inner = self
                .inner
                .lock()
                .map_err(|_| CryptoError::Io("key chain poisoned".into()))?;
            let subject = inner
                .keys
                .iter()
                .find(|entry| entry.key_name == *subject_key)
                .ok_or_else(|| CryptoError::InvalidKey(format!("unknown key `{subject_key}`")))?;
            let issuer = inner
                .keys
                .iter()
                .find(|entry| entry.key_name == *issuer_key)
                .ok_or_else(|| CryptoError::InvalidKey(format!("unknown key `{issuer_key}`")))?;
            (subject.private.public_key_der()?, issuer.private.clone())
        };

        let name = subject_key
            .clone()
            .append_str(issuer_id)
            .append(Component::version(version));
        let mut data = Data::new(name);
        data.set_content_type(content_type::KEY)
            .set_freshness_period(Some(Duration::from_secs(3600)))
            .set_content(subject_spki)
            .set_signature_info(
                SignatureInfo::new(verification::signature_type_for_key(
                    issuer_private.key_type(),
                )?)
                .with_key_locator(KeyLocator::Name(issuer_key.clone()))
                .with_validity_period(ValidityPeriod::new(
                    now - ChronoDuration::days(1),
                    now + ChronoDuration::days(365),
                )),
            );
        verification::sign_data(&mut data, Some(&issuer_private))?;
        let certificate = Certificate::from_data(data)
            .map_err(|e| CryptoError::Io(format!("issued certificate is invalid: {e}")))?;

        let mut inner = self
            .inner
            .lock()
            .map_err(|_| CryptoError::Io("key chain poisoned".into()))?;
        if let Some(entry) = inner
            .keys
            .iter_mut()
            .find(|entry| entry.key_name == *subject_key)
        {
            entry.certificate = Some(certificate.clone());
        }
        Ok(certificate)
    }

    /// The certificate of the (first) key under `identity`.
    pub fn certificate_of(&self, identity: &Name) -> Option<Certificate> {
        let inner = self.inner.lock().ok()?;
        inner
            .keys
            .iter()
            .find(|entry| entry.key_name.get_prefix(-2) == *identity)
            .and_then(|entry| entry.certificate.clone())
    }

    /// The name of the (first) key under `identity`.
    pub fn key_name_of(&self, identity: &Name) -> Option<Name> {
        let inner = self.inner.lock().ok()?;
        inner
            .keys
            .iter()
            .find(|entry| entry.key_name.get_prefix(-2) == *identity)
            .map(|entry| entry.key_name.clone())
    }

    fn resolve(&self, signer: &SignerType) -> Result<(Name, PrivateKey), CryptoError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| CryptoError::Io("key chain poisoned".into()))?;
        let entry = match signer {
            SignerType::Default => {
                let identity = inner
                    .default_identity
                    .clone()
                    .ok_or_else(|| CryptoError::InvalidKey("no default identity".into()))?;
                inner
                    .keys
                    .iter()
                    .find(|entry| entry.key_name.get_prefix(-2) == identity)
            }
            SignerType::Identity(identity) => inner
                .keys
                .iter()
                .find(|entry| entry.key_name.get_prefix(-2) == *identity),
            SignerType::Key(key_name) => {
                inner.keys.iter().find(|entry| entry.key_name == *key_name)
            }
            SignerType::Certificate(cert_name) => inner.keys.iter().find(|entry| {
                entry
                    .certificate
                    .as_ref()
                    .is_some_and(|cert| cert.name() == cert_name)
            }),
            SignerType::Sha256 => {
                return Err(CryptoError::InvalidKey(
                    "digest signing carries no key".into(),
                ))
            }
        };
        let entry = entry.ok_or_else(|| CryptoError::InvalidKey("no matching key".into()))?;
        Ok((entry.key_name.clone(), entry.private.clone()))
    }

    fn next_seq_num(&self, key_name: &Name) -> u64 {
        self.inner
            .lock()
            .ok()
            .and_then(|mut inner| {
                inner
                    .keys
                    .iter_mut()
                    .find(|entry| entry.key_name == *key_name)
                    .map(|entry| {
                        let seq_num = entry.next_seq_num;
                        entry.next_seq_num += 1;
                        seq_num
                    })
            })
            .unwrap_or(0)
    }

    /// Builds and signs an Interest for `name` in the given format.
    pub fn make_signed_interest(
        &self,
        name: Name,
        info: &SigningInfo,
        format: SignedInterestFormat,
    ) -> Result<Interest, CryptoError> {
        let mut interest = Interest::new(name);
        self.sign_interest(&mut interest, info, format)?;
        Ok(interest)
    }
}

impl Default for MemoryKeyChain {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyChain for MemoryKeyChain {
    fn sign_data(&self, data: &mut Data, info: &SigningInfo) -> Result<(), CryptoError> {
        if matches!(info.signer, SignerType::Sha256) {
            data.set_signature_info(SignatureInfo::new(
                verification::signature_type_for_key(KeyType::None)?,
            ));
            return verification::sign_data(data, None);
        }

        let (key_name, private) = self.resolve(&info.signer)?;
        let mut sig_info = SignatureInfo::new(verification::signature_type_for_key(
            private.key_type(),
        )?)
        .with_key_locator(KeyLocator::Name(key_name));
        // Keep a caller-provided validity window (certificate signing).
        if let Some(period) = data
            .signature_info()
            .and_then(|existing| existing.validity_period())
        {
            sig_info.set_validity_period(Some(*period));
        }
        data.set_signature_info(sig_info);
        verification::sign_data(data, Some(&private))
    }

    fn sign_interest(
        &self,
        interest: &mut Interest,
        info: &SigningInfo,
        format: SignedInterestFormat,
    ) -> Result<(), CryptoError> {
        let (key_name, private) = self.resolve(&info.signer)?;
        let now = self.clock.system_now();
        match format {
            SignedInterestFormat::V03 => {
                let mut sig_info = SignatureInfo::new(verification::signature_type_for_key(
                    private.key_type(),
                )?)
                .with_key_locator(KeyLocator::Name(key_name.clone()));
                sig_info
                    .set_time(Some(now))
                    .set_nonce(Some(random_nonce()))
                    .set_seq_num(Some(self.next_seq_num(&key_name)));
                interest.set_signature_info(sig_info);
                verification::sign_interest_v03(interest, Some(&private))
            }
            SignedInterestFormat::V02 => {
                let sig_info = SignatureInfo::new(verification::signature_type_for_key(
                    private.key_type(),
                )?)
                .with_key_locator(KeyLocator::Name(key_name));
                let name = interest
                    .name()
                    .clone()
                    .append(Component::number(now.timestamp_millis().max(0) as u64))
                    .append(Component::generic(random_nonce()));
                interest.set_name(name);
                verification::append_v02_signature(interest, &sig_info, Some(&private))
            }
        }
    }
}
