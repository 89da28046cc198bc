// Path: crates/security/src/io.rs
//! Certificate file I/O.
//!
//! Two on-disk forms are understood: raw DER (the Data wire encoding) and
//! Base64 text wrapped at 64 columns. Loading sniffs the form from the
//! first byte: a Data TLV starts with 0x06, which never begins valid
//! Base64 text.

use ndn_crypto::transform::{
    base64_decode, base64_encode, buffer_source, stream_sink, strip_space,
};
use ndn_types::error::ConfigError;
use ndn_types::Certificate;
use std::path::Path;

const TLV_DATA_MARKER: u8 = 0x06;

fn anchor_error(path: &Path, message: impl std::fmt::Display) -> ConfigError {
    ConfigError::AnchorLoad {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// Encodes a certificate as 64-column-wrapped Base64 text.
pub fn encode_certificate_base64(certificate: &Certificate) -> Result<String, ConfigError> {
    let wire = certificate
        .wire_encode()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let mut out = Vec::new();
    buffer_source(wire)
        .pipe(base64_encode(true))
        .run(stream_sink(&mut out))
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    String::from_utf8(out).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Decodes a certificate from Base64 text (whitespace tolerated).
pub fn decode_certificate_base64(text: &[u8]) -> Result<Certificate, ConfigError> {
    let mut wire = Vec::new();
    buffer_source(text.to_vec())
        .pipe(strip_space())
        .pipe(base64_decode())
        .run(stream_sink(&mut wire))
        .map_err(|e| ConfigError::Invalid(format!("invalid base64 certificate: {e}")))?;
    Certificate::wire_decode(&wire).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Loads a certificate from a file holding raw DER or Base64 text.
pub fn load_certificate(path: &Path) -> Result<Certificate, ConfigError> {
    let bytes = std::fs::read(path).map_err(|e| anchor_error(path, e))?;
    if bytes.first() == Some(&TLV_DATA_MARKER) {
        Certificate::wire_decode(&bytes).map_err(|e| anchor_error(path, e))
    } else {
        decode_certificate_base64(&bytes).map_err(|e| anchor_error(path, e))
    }
}

/// Saves a certificate; `base64` selects the text form over raw DER.
pub fn save_certificate(
    certificate: &Certificate,
    path: &Path,
    base64: bool,
) -> Result<(), ConfigError> {
    let bytes = if base64 {
        encode_certificate_base64(certificate)?.into_bytes()
    } else {
        certificate
            .wire_encode()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
    };
    std::fs::write(path, bytes).map_err(|e| anchor_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_types::tlv::content_type;
    use ndn_types::{Data, KeyLocator, Name, SignatureInfo, SignatureType, ValidityPeriod};
    use std::time::Duration;

    fn make_cert() -> Certificate {
        let mut data = Data::new(Name::from_uri("/io/test/KEY/%01/self/v=1").unwrap());
        data.set_content_type(content_type::KEY)
            .set_freshness_period(Some(Duration::from_secs(3600)))
            .set_content(vec![0x30, 0x0A, 0x01, 0x02])
            .set_signature_info(
                SignatureInfo::new(SignatureType::Sha256WithEcdsa)
                    .with_key_locator(KeyLocator::Name(Name::from_uri("/io/KEY/x").unwrap()))
                    .with_validity_period(ValidityPeriod::new(
                        chrono::Utc::now() - chrono::Duration::days(1),
                        chrono::Utc::now() + chrono::Duration::days(1),
                    )),
            )
            .set_signature_value(vec![7; 32]);
        Certificate::from_data(data).unwrap()
    }

    #[test]
    fn base64_roundtrip_wraps_at_64() {
        let cert = make_cert();
        let text = encode_certificate_base64(&cert).unwrap();
        assert!(text.lines().all(|line| line.len() <= 64));
        let decoded = decode_certificate_base64(text.as_bytes()).unwrap();
        assert_eq!(decoded, cert);
    }

    #[test]
    fn file_roundtrip_both_forms() {
        let cert = make_cert();
        let dir = std::env::temp_dir().join(format!("ndn-io-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let der_path = dir.join("cert.der");
        save_certificate(&cert, &der_path, false).unwrap();
        assert_eq!(load_certificate(&der_path).unwrap(), cert);

        let b64_path = dir.join("cert.ndncert");
        save_certificate(&cert, &b64_path, true).unwrap();
        assert_eq!(load_certificate(&b64_path).unwrap(), cert);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
