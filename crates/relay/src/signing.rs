//! Request body signatures.
//!
//! The `sign` header is `base64(AES-256-CBC(rotate(hex(sha256(body)))))`, where
//! `rotate` moves the last 8 hex characters to the front and the first 8 to
//! the back. The key is a 16-character secret zero-padded to 32 bytes. Output
//! depends only on the body, so the same body always signs the same way.

use aes::Aes256;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use sha2::{Digest, Sha256};

use crate::errors::SignError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

const SECRET_LEN: usize = 16;
const ROTATE: usize = 8;

#[derive(Clone)]
pub struct RequestSigner {
    key: [u8; 32],
    iv: [u8; 16],
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(secret: &str, iv: &str) -> Result<Self, SignError> {
        if secret.len() != SECRET_LEN || !secret.is_ascii() {
            return Err(SignError::SecretLength(secret.len()));
        }
        if !iv.is_ascii() {
            return Err(SignError::IvLength(iv.len()));
        }
        let iv: [u8; 16] = iv
            .as_bytes()
            .try_into()
            .map_err(|_| SignError::IvLength(iv.len()))?;

        let mut key = [0u8; 32];
        key[..SECRET_LEN].copy_from_slice(secret.as_bytes());

        Ok(Self { key, iv })
    }

    /// Signs the exact serialized body that goes on the wire.
    pub fn sign(&self, body: &str) -> String {
        let digest = hex_digest(body.as_bytes());
        let rotated = rotate_digest(&digest);
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(rotated.as_bytes());
        BASE64.encode(ciphertext)
    }
}

fn hex_digest(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// `digest[-8:] + digest[8:-8] + digest[:8]`.
fn rotate_digest(digest: &str) -> String {
    let n = digest.len();
    if n < ROTATE * 2 {
        return digest.to_string();
    }
    format!(
        "{}{}{}",
        &digest[n - ROTATE..],
        &digest[ROTATE..n - ROTATE],
        &digest[..ROTATE]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockDecryptMut;

    const SECRET: &str = "0123456789abcdef";
    const IV: &str = "fedcba9876543210";

    fn signer() -> RequestSigner {
        RequestSigner::new(SECRET, IV).unwrap()
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            signer().sign(r#"{"a":1}"#),
            "Ftpdmf41NAlwOST5biagNg1YNvRpW5M1dLzyNiMOTX5b3hmqBByaaqTeT2XZd8FvZr0Drmlte7Ii6JJM/qmzAMAaOYXmwaF8qZH2qN6agGA="
        );
        assert_eq!(
            signer().sign(""),
            "OPx3ILTF4nOnEzkF1HMK3/AjtWKgfzYB4x6gKXMTnXwbvBRHiCJTwXnWvDAVGpIT/994HyrGAh4P2I1GPOaKoCzfvRM6vV295llrZxn78i0="
        );
    }

    #[test]
    fn test_rotation() {
        let digest = hex_digest(b"");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            rotate_digest(&digest),
            "7852b85598fc1c149afbf4c8996fb92427ae41e4649b934ca495991be3b0c442"
        );
    }

    #[test]
    fn test_decrypts_to_rotated_digest() {
        let body = r#"{"runRecordCode":"abc","timestamp":"1700000000000"}"#;
        let token = signer().sign(body);

        let mut key = [0u8; 32];
        key[..16].copy_from_slice(SECRET.as_bytes());
        let iv: [u8; 16] = IV.as_bytes().try_into().unwrap();
        let ciphertext = BASE64.decode(token).unwrap();
        let plain = cbc::Decryptor::<Aes256>::new(&key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .unwrap();

        assert_eq!(
            String::from_utf8(plain).unwrap(),
            rotate_digest(&hex_digest(body.as_bytes()))
        );
    }

    #[test]
    fn test_deterministic() {
        let body = r#"{"x":"y"}"#;
        assert_eq!(signer().sign(body), signer().sign(body));
        assert_ne!(signer().sign(body), signer().sign(r#"{"x":"z"}"#));
    }

    #[test]
    fn test_rejects_bad_material() {
        assert!(matches!(
            RequestSigner::new("short", IV),
            Err(SignError::SecretLength(5))
        ));
        assert!(matches!(
            RequestSigner::new(SECRET, "0123"),
            Err(SignError::IvLength(4))
        ));
    }
}
