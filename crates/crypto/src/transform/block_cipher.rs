// Path: crates/crypto/src/transform/block_cipher.rs
//! AES-CBC block cipher filter with PKCS#7 padding.

use crate::transform::base::Transform;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use ndn_types::error::{CryptoError, TransformErrorKind};

/// AES block size, which CBC requires the IV to match.
pub const AES_BLOCK_SIZE: usize = 16;

/// Direction of the cipher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherOperator {
    /// Plaintext in, ciphertext out.
    Encrypt,
    /// Ciphertext in, plaintext out.
    Decrypt,
}

/// Supported block cipher algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCipherAlgorithm {
    /// AES in CBC mode; the key length selects AES-128/192/256.
    AesCbc,
}

/// Buffers the stream and applies AES-CBC on finalize.
pub struct BlockCipher {
    operator: CipherOperator,
    key: Vec<u8>,
    iv: [u8; AES_BLOCK_SIZE],
    buffer: Vec<u8>,
    done: bool,
}

impl Transform for BlockCipher {
    fn convert(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, TransformErrorKind> {
        let _ = out;
        if self.done {
            return Err(TransformErrorKind::InputClosed);
        }
        self.buffer.extend_from_slice(input);
        Ok(input.len())
    }

    fn finalize(&mut self, out: &mut Vec<u8>) -> Result<(), TransformErrorKind> {
        self.done = true;
        let result = match self.operator {
            CipherOperator::Encrypt => Ok(match self.key.len() {
                16 => encrypt::<Aes128>(&self.key, &self.iv, &self.buffer),
                24 => encrypt::<Aes192>(&self.key, &self.iv, &self.buffer),
                _ => encrypt::<Aes256>(&self.key, &self.iv, &self.buffer),
            }),
            CipherOperator::Decrypt => match self.key.len() {
                16 => decrypt::<Aes128>(&self.key, &self.iv, &self.buffer),
                24 => decrypt::<Aes192>(&self.key, &self.iv, &self.buffer),
                _ => decrypt::<Aes256>(&self.key, &self.iv, &self.buffer),
            },
        };
        self.buffer.clear();
        match result {
            Ok(output) => {
                out.extend_from_slice(&output);
                Ok(())
            }
            Err(e) => Err(TransformErrorKind::Crypto(e)),
        }
    }
}

fn encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Vec<u8>
where
    C: BlockEncryptMut + aes::cipher::BlockCipher + aes::cipher::KeyInit,
{
    match cbc::Encryptor::<C>::new_from_slices(key, iv) {
        Ok(cipher) => cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        // Lengths are validated at construction.
        Err(_) => Vec::new(),
    }
}

fn decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: BlockDecryptMut + aes::cipher::BlockCipher + aes::cipher::KeyInit,
{
    let cipher = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| CryptoError::CipherFailed(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::CipherFailed("bad ciphertext or padding".into()))
}

/// Creates an AES-CBC filter.
///
/// The key must be 16, 24, or 32 bytes; the IV length must equal the
/// cipher block size.
pub fn block_cipher(
    operator: CipherOperator,
    algorithm: BlockCipherAlgorithm,
    key: &[u8],
    iv: &[u8],
) -> Result<BlockCipher, CryptoError> {
    let BlockCipherAlgorithm::AesCbc = algorithm;
    if !matches!(key.len(), 16 | 24 | 32) {
        return Err(CryptoError::InvalidKey(format!(
            "AES key must be 16, 24, or 32 bytes, got {}",
            key.len()
        )));
    }
    let iv: [u8; AES_BLOCK_SIZE] = iv.try_into().map_err(|_| {
        CryptoError::CipherFailed(format!(
            "IV must be {AES_BLOCK_SIZE} bytes, got {}",
            iv.len()
        ))
    })?;
    Ok(BlockCipher {
        operator,
        key: key.to_vec(),
        iv,
        buffer: Vec::new(),
        done: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::base::buffer_source;
    use crate::transform::sinks::stream_sink;

    fn roundtrip(key: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let iv = [0x24u8; AES_BLOCK_SIZE];
        let mut ciphertext = Vec::new();
        buffer_source(plaintext.to_vec())
            .pipe(
                block_cipher(
                    CipherOperator::Encrypt,
                    BlockCipherAlgorithm::AesCbc,
                    key,
                    &iv,
                )
                .unwrap(),
            )
            .run(stream_sink(&mut ciphertext))
            .unwrap();
        assert_ne!(ciphertext, plaintext);
        assert_eq!(ciphertext.len() % AES_BLOCK_SIZE, 0);

        let mut decrypted = Vec::new();
        buffer_source(ciphertext)
            .pipe(
                block_cipher(
                    CipherOperator::Decrypt,
                    BlockCipherAlgorithm::AesCbc,
                    key,
                    &iv,
                )
                .unwrap(),
            )
            .run(stream_sink(&mut decrypted))
            .unwrap();
        decrypted
    }

    #[test]
    fn encrypt_decrypt_all_key_sizes() {
        let plaintext = b"attack at dawn, but pad me first";
        for key_len in [16usize, 24, 32] {
            let key = vec![0x42u8; key_len];
            assert_eq!(roundtrip(&key, plaintext), plaintext);
        }
    }

    #[test]
    fn wrong_key_length_rejected() {
        assert!(block_cipher(
            CipherOperator::Encrypt,
            BlockCipherAlgorithm::AesCbc,
            &[0u8; 10],
            &[0u8; AES_BLOCK_SIZE],
        )
        .is_err());
    }

    #[test]
    fn wrong_iv_length_rejected() {
        assert!(block_cipher(
            CipherOperator::Encrypt,
            BlockCipherAlgorithm::AesCbc,
            &[0u8; 16],
            &[0u8; 8],
        )
        .is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_padding() {
        let key = [9u8; 16];
        let iv = [3u8; AES_BLOCK_SIZE];
        let mut ciphertext = Vec::new();
        buffer_source(b"sixteen byte msg".to_vec())
            .pipe(
                block_cipher(
                    CipherOperator::Encrypt,
                    BlockCipherAlgorithm::AesCbc,
                    &key,
                    &iv,
                )
                .unwrap(),
            )
            .run(stream_sink(&mut ciphertext))
            .unwrap();

        // Truncate to a non-block length.
        ciphertext.pop();
        let mut decrypted = Vec::new();
        assert!(buffer_source(ciphertext)
            .pipe(
                block_cipher(
                    CipherOperator::Decrypt,
                    BlockCipherAlgorithm::AesCbc,
                    &key,
                    &iv,
                )
                .unwrap(),
            )
            .run(stream_sink(&mut decrypted))
            .is_err());
    }
}
