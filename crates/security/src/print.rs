// Path: crates/security/src/print.rs
//! Human-readable certificate printer.

use ndn_crypto::PublicKey;
use ndn_types::tlv::number;
use ndn_types::{AdditionalDescription, Certificate};
use std::fmt;

/// Formats a certificate for humans: name, additional description,
/// public-key type and size, validity window, and signature information.
pub struct CertificatePrinter<'a>(pub &'a Certificate);

impl fmt::Display for CertificatePrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cert = self.0;
        writeln!(f, "Certificate Name:")?;
        writeln!(f, "  {}", cert.name())?;

        if let Some(info) = cert.as_data().signature_info() {
            if let Some(block) = info.custom_tlv(number::ADDITIONAL_DESCRIPTION) {
                if let Ok(description) = AdditionalDescription::from_block(block) {
                    writeln!(f, "Additional Description:")?;
                    for (key, value) in description.iter() {
                        writeln!(f, "  {key}: {value}")?;
                    }
                }
            }
        }

        writeln!(f, "Public Key:")?;
        match PublicKey::from_public_key_der(cert.public_key()) {
            Ok(key) => writeln!(f, "  Key Type: {}-bit {}", key.key_size(), key.key_type())?,
            Err(_) => writeln!(f, "  Key Type: Unknown ({} bytes)", cert.public_key().len())?,
        }
        for line in base64_lines(cert.public_key()) {
            writeln!(f, "  {line}")?;
        }

        let period = cert.validity_period();
        writeln!(f, "Validity:")?;
        writeln!(
            f,
            "  Not Before: {}",
            period.not_before().format("%Y-%m-%dT%H:%M:%S")
        )?;
        writeln!(
            f,
            "  Not After: {}",
            period.not_after().format("%Y-%m-%dT%H:%M:%S")
        )?;

        writeln!(f, "Signature Information:")?;
        if let Some(info) = cert.as_data().signature_info() {
            writeln!(f, "  Signature Type: {}", info.sig_type())?;
            if let Some(locator) = info.key_locator() {
                writeln!(f, "  Key Locator: {locator}")?;
            }
            if cert.is_self_signed() {
                writeln!(f, "  Self-Signed: yes")?;
            }
        }
        Ok(())
    }
}

fn base64_lines(bytes: &[u8]) -> Vec<String> {
    use ndn_crypto::transform::{base64_encode, buffer_source, stream_sink};
    let mut out = Vec::new();
    if buffer_source(bytes.to_vec())
        .pipe(base64_encode(true))
        .run(stream_sink(&mut out))
        .is_err()
    {
        return Vec::new();
    }
    String::from_utf8_lossy(&out)
        .lines()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_crypto::{generate_private_key, KeyParams};
    use ndn_types::tlv::content_type;
    use ndn_types::{
        Data, KeyLocator, Name, SignatureInfo, SignatureType, ValidityPeriod,
    };
    use std::time::Duration;

    #[test]
    fn printer_reports_key_and_validity() {
        let key = generate_private_key(&KeyParams::Ec { bits: 256 }).unwrap();
        let mut description = AdditionalDescription::new();
        description.set("issued-by", "tests");

        let mut info = SignatureInfo::new(SignatureType::Sha256WithEcdsa)
            .with_key_locator(KeyLocator::Name(Name::from_uri("/printer/KEY/%01").unwrap()))
            .with_validity_period(ValidityPeriod::new(
                chrono::Utc::now() - chrono::Duration::days(1),
                chrono::Utc::now() + chrono::Duration::days(1),
            ));
        info.set_custom_tlv(description.to_block()).unwrap();

        let mut data = Data::new(Name::from_uri("/printer/KEY/%01/self/v=1").unwrap());
        data.set_content_type(content_type::KEY)
            .set_freshness_period(Some(Duration::from_secs(3600)))
            .set_content(key.public_key_der().unwrap())
            .set_signature_info(info)
            .set_signature_value(vec![0; 32]);
        let cert = Certificate::from_data(data).unwrap();

        let text = CertificatePrinter(&cert).to_string();
        assert!(text.contains("/printer/KEY/%01/self/v=1"));
        assert!(text.contains("256-bit EC"));
        assert!(text.contains("issued-by: tests"));
        assert!(text.contains("Not Before"));
        assert!(text.contains("Self-Signed: yes"));
    }
}
