// Path: crates/security/tests/validation.rs
//! End-to-end validation scenarios: replay protection over a certificate
//! chain, configuration-driven hierarchies, and chain pathologies.

use ndn_api::security::{KeyChain, SignerType, SigningInfo};
use ndn_security::fetcher::NetworkFetcher;
use ndn_security::policy::{CommandInterestOptions, CommandInterestPolicy, SimpleHierarchyPolicy};
use ndn_security::{Validator, ValidatorConfig};
use ndn_test_utils::{MemoryKeyChain, MockFace, VirtualClock};
use ndn_types::error::ValidationErrorCode;
use ndn_types::{Data, Name, SignedInterestFormat};
use std::sync::Arc;
use std::time::Duration;

fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap()
}

struct Fixture {
    clock: Arc<VirtualClock>,
    key_chain: MemoryKeyChain,
    face: Arc<MockFace>,
}

impl Fixture {
    fn new() -> Self {
        let clock = Arc::new(VirtualClock::new());
        Self {
            key_chain: MemoryKeyChain::with_clock(clock.clone()),
            face: Arc::new(MockFace::new()),
            clock,
        }
    }

    /// Anchor identity plus a sub-identity certified by the anchor; the
    /// sub certificate is fetchable through the face.
    fn anchored_sub_identity(&self, anchor: &str, sub: &str) -> (Name, Name) {
        self.key_chain.create_identity(&name(anchor)).unwrap();
        let anchor_key = self.key_chain.key_name_of(&name(anchor)).unwrap();
        let sub_key = self.key_chain.create_key(&name(sub)).unwrap();
        let sub_cert = self
            .key_chain
            .issue_certificate(&sub_key, &anchor_key, "parent")
            .unwrap();
        self.face.add_response(sub_cert.into_data());
        (anchor_key, sub_key)
    }

    fn command_interest_validator(&self) -> Validator {
        let policy = CommandInterestPolicy::with_clock(
            Box::new(SimpleHierarchyPolicy),
            CommandInterestOptions::default(),
            self.clock.clone(),
        );
        Validator::with_clock(
            Box::new(policy),
            Box::new(NetworkFetcher::new(self.face.clone())),
            self.clock.clone(),
        )
    }
}

#[tokio::test]
async fn command_interest_replay_protection() {
    let fixture = Fixture::new();
    let (_, sub_key) =
        fixture.anchored_sub_identity("/Security/ValidatorFixture", "/Security/ValidatorFixture/Sub1");
    let validator = fixture.command_interest_validator();
    let anchor_cert = fixture
        .key_chain
        .certificate_of(&name("/Security/ValidatorFixture"))
        .unwrap();
    validator.load_anchor(anchor_cert);

    let signing = SigningInfo {
        signer: SignerType::Key(sub_key),
        ..SigningInfo::default()
    };
    let interest = fixture
        .key_chain
        .make_signed_interest(
            name("/Security/ValidatorFixture/Sub1/CMD"),
            &signing,
            SignedInterestFormat::V02,
        )
        .unwrap();

    // First presentation succeeds.
    validator.validate_interest(&interest).await.unwrap();

    // The identical Interest is a replay.
    let err = validator.validate_interest(&interest).await.unwrap_err();
    assert_eq!(err.code, ValidationErrorCode::PolicyError);

    // A fresh Interest built 5 ms later succeeds.
    fixture.clock.advance(Duration::from_millis(5));
    let fresh = fixture
        .key_chain
        .make_signed_interest(
            name("/Security/ValidatorFixture/Sub1/CMD"),
            &signing,
            SignedInterestFormat::V02,
        )
        .unwrap();
    validator.validate_interest(&fresh).await.unwrap();
}

#[tokio::test]
async fn command_interest_outside_grace_period_fails() {
    let fixture = Fixture::new();
    let (_, sub_key) =
        fixture.anchored_sub_identity("/Security/ValidatorFixture", "/Security/ValidatorFixture/Sub1");
    let validator = fixture.command_interest_validator();
    validator.load_anchor(
        fixture
            .key_chain
            .certificate_of(&name("/Security/ValidatorFixture"))
            .unwrap(),
    );

    let signing = SigningInfo {
        signer: SignerType::Key(sub_key),
        ..SigningInfo::default()
    };
    let stale = fixture
        .key_chain
        .make_signed_interest(
            name("/Security/ValidatorFixture/Sub1/CMD"),
            &signing,
            SignedInterestFormat::V02,
        )
        .unwrap();

    // The packet was stamped now; present it beyond the 120 s grace.
    fixture.clock.advance(Duration::from_secs(200));
    let err = validator.validate_interest(&stale).await.unwrap_err();
    assert_eq!(err.code, ValidationErrorCode::PolicyError);
}

const HIERARCHICAL_CONFIG: &str = r#"
rule
{
  id "hierarchical data"
  for data
  checker
  {
    type hierarchical
    sig-type ecdsa-sha256
  }
}
trust-anchor
{
  type file
  file-name anchor.ndncert
}
"#;

#[tokio::test]
async fn validator_config_hierarchical_rule() {
    let fixture = Fixture::new();
    let (_, sub_key) =
        fixture.anchored_sub_identity("/Security/ValidatorFixture", "/Security/ValidatorFixture/Sub1");
    let anchor_cert = fixture
        .key_chain
        .certificate_of(&name("/Security/ValidatorFixture"))
        .unwrap();

    // The anchor arrives through a config file reference.
    let dir = std::env::temp_dir().join(format!("ndn-vc-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    ndn_security::io::save_certificate(&anchor_cert, &dir.join("anchor.ndncert"), true).unwrap();

    let validator = ValidatorConfig::with_clock(
        Box::new(NetworkFetcher::new(fixture.face.clone())),
        fixture.clock.clone(),
    );
    validator.load_str(HIERARCHICAL_CONFIG, &dir).unwrap();

    // Data under the sub-identity, signed by the sub-identity: accepted.
    let mut data = Data::new(name("/Security/ValidatorFixture/Sub1/Sub2/Packet"));
    data.set_content(b"payload".to_vec());
    fixture
        .key_chain
        .sign_data(
            &mut data,
            &SigningInfo {
                signer: SignerType::Key(sub_key),
                ..SigningInfo::default()
            },
        )
        .unwrap();
    validator.validate_data(&data).await.unwrap();

    // The same name signed by a foreign identity: policy failure.
    fixture
        .key_chain
        .create_identity(&name("/Security/OtherIdentity"))
        .unwrap();
    let mut foreign = Data::new(name("/Security/ValidatorFixture/Sub1/Sub2/Packet"));
    foreign.set_content(b"payload".to_vec());
    fixture
        .key_chain
        .sign_data(
            &mut foreign,
            &SigningInfo::with_identity(name("/Security/OtherIdentity")),
        )
        .unwrap();
    let err = validator.validate_data(&foreign).await.unwrap_err();
    assert_eq!(err.code, ValidationErrorCode::PolicyError);

    std::fs::remove_dir_all(&dir).unwrap();
}

/// Builds the /loop key ring: k1 certified by k2, k2 by k3, k3 by k1.
fn build_loop_fixture(fixture: &Fixture) -> Name {
    let k1 = fixture.key_chain.create_key(&name("/loop")).unwrap();
    let k2 = fixture.key_chain.create_key(&name("/loop")).unwrap();
    let k3 = fixture.key_chain.create_key(&name("/loop")).unwrap();
    for (subject, issuer) in [(&k1, &k2), (&k2, &k3), (&k3, &k1)] {
        let cert = fixture
            .key_chain
            .issue_certificate(subject, issuer, "ring")
            .unwrap();
        fixture.face.add_response(cert.into_data());
    }
    k1
}

#[tokio::test]
async fn certificate_loop_is_detected_after_three_fetches() {
    let fixture = Fixture::new();
    let k1 = build_loop_fixture(&fixture);
    let validator = fixture.command_interest_validator();

    let mut data = Data::new(name("/loop/Data"));
    data.set_content(b"x".to_vec());
    fixture
        .key_chain
        .sign_data(
            &mut data,
            &SigningInfo {
                signer: SignerType::Key(k1),
                ..SigningInfo::default()
            },
        )
        .unwrap();

    let err = validator.validate_data(&data).await.unwrap_err();
    assert_eq!(err.code, ValidationErrorCode::LoopDetected);
    assert_eq!(fixture.face.expressed_count(), 3);
}

#[tokio::test]
async fn chain_deeper_than_max_depth_is_rejected() {
    let fixture = Fixture::new();
    let k1 = build_loop_fixture(&fixture);
    let mut validator = fixture.command_interest_validator();
    validator.set_max_depth(2);

    let mut data = Data::new(name("/loop/Data"));
    fixture
        .key_chain
        .sign_data(
            &mut data,
            &SigningInfo {
                signer: SignerType::Key(k1),
                ..SigningInfo::default()
            },
        )
        .unwrap();

    let err = validator.validate_data(&data).await.unwrap_err();
    assert_eq!(err.code, ValidationErrorCode::ExceededDepthLimit);
}

#[tokio::test]
async fn reset_verified_certificates_forces_refetch() {
    let fixture = Fixture::new();
    let (_, sub_key) =
        fixture.anchored_sub_identity("/Security/ValidatorFixture", "/Security/ValidatorFixture/Sub1");
    let validator = fixture.command_interest_validator();
    validator.load_anchor(
        fixture
            .key_chain
            .certificate_of(&name("/Security/ValidatorFixture"))
            .unwrap(),
    );
    let signing = SigningInfo {
        signer: SignerType::Key(sub_key),
        ..SigningInfo::default()
    };

    let mut data = Data::new(name("/Security/ValidatorFixture/Sub1/d1"));
    fixture.key_chain.sign_data(&mut data, &signing).unwrap();
    validator.validate_data(&data).await.unwrap();
    assert_eq!(fixture.face.expressed_count(), 1);

    // The intermediate certificate is now trusted; no second fetch.
    let mut data2 = Data::new(name("/Security/ValidatorFixture/Sub1/d2"));
    fixture.key_chain.sign_data(&mut data2, &signing).unwrap();
    validator.validate_data(&data2).await.unwrap();
    assert_eq!(fixture.face.expressed_count(), 1);

    // After a reset the chain must be fetched again.
    validator.reset_verified_certificates();
    let mut data3 = Data::new(name("/Security/ValidatorFixture/Sub1/d3"));
    fixture.key_chain.sign_data(&mut data3, &signing).unwrap();
    validator.validate_data(&data3).await.unwrap();
    assert_eq!(fixture.face.expressed_count(), 2);
}

#[tokio::test]
async fn fetch_retries_then_fails() {
    let fixture = Fixture::new();
    let (_, sub_key) =
        fixture.anchored_sub_identity("/Security/ValidatorFixture", "/Security/ValidatorFixture/Sub1");
    let validator = fixture.command_interest_validator();

    // Exhaust the retry budget: initial attempt plus three retries.
    for _ in 0..4 {
        fixture.face.push_error(ndn_types::error::FaceError::Timeout);
    }
    let mut data = Data::new(name("/Security/ValidatorFixture/Sub1/d"));
    fixture
        .key_chain
        .sign_data(
            &mut data,
            &SigningInfo {
                signer: SignerType::Key(sub_key),
                ..SigningInfo::default()
            },
        )
        .unwrap();

    let err = validator.validate_data(&data).await.unwrap_err();
    assert_eq!(err.code, ValidationErrorCode::CannotRetrieveCert);
    assert_eq!(fixture.face.expressed_count(), 4);
}
