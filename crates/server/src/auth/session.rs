//! Sealed session tokens.
//!
//! An [`Identity`] is serialized to JSON, sealed with AES-256-GCM
//! under a key derived from the configured server secret, and carried
//! as a base64url cookie value. The AEAD tag makes the token
//! tamper-evident: flipping a bit, truncating, or sealing under a
//! rotated-out secret all fail authentication before anything is
//! parsed. Rotating the secret therefore invalidates every
//! outstanding session and forces re-login.

use std::time::Duration;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Identity;
use crate::config::SessionConfig;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits).
const NONCE_SIZE: usize = 12;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Tag mismatch, truncation, or an unparseable payload. Also the
    /// outcome for tokens sealed under a different secret.
    #[error("session token failed verification")]
    Invalid,
    /// Authentic token older than the configured max age.
    #[error("session token expired")]
    Expired,
}

/// What the token actually carries: the identity plus its issue time,
/// so `decode` can enforce a maximum session age.
#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    identity: Identity,
    issued_at: i64,
}

pub struct SessionCodec {
    key: [u8; 32],
    max_age: Duration,
}

impl SessionCodec {
    pub fn new(config: &SessionConfig) -> Self {
        // The configured secret is free-form text; derive a fixed-size
        // AEAD key from it. Computed once, immutable afterwards.
        let digest = Sha256::digest(config.secret_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self {
            key,
            max_age: config.max_age,
        }
    }

    /// Seal an identity into an opaque token. Fresh nonce per call,
    /// so identical inputs produce different tokens.
    pub fn encode(&self, identity: &Identity) -> String {
        self.seal(&Payload {
            identity: identity.clone(),
            issued_at: Utc::now().timestamp(),
        })
    }

    /// Verify and open a token.
    ///
    /// Absent tokens are the caller's concern; this only ever sees a
    /// present value and answers valid, invalid, or expired.
    pub fn decode(&self, token: &str) -> Result<Identity, SessionError> {
        let combined = B64.decode(token).map_err(|_| SessionError::Invalid)?;
        if combined.len() < NONCE_SIZE {
            return Err(SessionError::Invalid);
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);

        let cipher =
            Aes256Gcm::new_from_slice(&self.key).expect("key is exactly 32 bytes");
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| SessionError::Invalid)?;

        let payload: Payload =
            serde_json::from_slice(&plaintext).map_err(|_| SessionError::Invalid)?;

        let age = Utc::now().timestamp().saturating_sub(payload.issued_at);
        if age < 0 || age as u64 > self.max_age.as_secs() {
            return Err(SessionError::Expired);
        }

        Ok(payload.identity)
    }

    fn seal(&self, payload: &Payload) -> String {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).expect("key is exactly 32 bytes");

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let plaintext = serde_json::to_vec(payload).expect("payload serializes");
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .expect("AES-GCM encryption is infallible for in-memory data");

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        B64.encode(&combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> SessionCodec {
        let config = SessionConfig::new(secret, "mediai_session", false).unwrap();
        SessionCodec::new(&config)
    }

    fn identity() -> Identity {
        Identity::new(
            "user-1".to_string(),
            "a@b.com".to_string(),
            Some("Ada".to_string()),
        )
    }

    #[test]
    fn encode_decode_roundtrip() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        let id = identity();
        let token = codec.encode(&id);
        assert_eq!(codec.decode(&token).unwrap(), id);
    }

    #[test]
    fn encoding_is_not_deterministic() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        let id = identity();
        assert_ne!(codec.encode(&id), codec.encode(&id));
    }

    #[test]
    fn token_fits_in_a_cookie() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        let token = codec.encode(&identity());
        assert!(token.len() < 4096);
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        let token = codec.encode(&identity());
        let raw = B64.decode(&token).unwrap();

        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut tampered = raw.clone();
                tampered[byte] ^= 1 << bit;
                let tampered = B64.encode(&tampered);
                assert_eq!(
                    codec.decode(&tampered),
                    Err(SessionError::Invalid),
                    "flip at byte {byte} bit {bit} was accepted"
                );
            }
        }
    }

    #[test]
    fn truncated_and_garbage_tokens_are_invalid() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        assert_eq!(codec.decode(""), Err(SessionError::Invalid));
        assert_eq!(codec.decode("AAAA"), Err(SessionError::Invalid));
        assert_eq!(codec.decode("not base64!!"), Err(SessionError::Invalid));

        let token = codec.encode(&identity());
        let truncated = &token[..token.len() / 2];
        assert_eq!(codec.decode(truncated), Err(SessionError::Invalid));
    }

    #[test]
    fn rotated_secret_rejects_old_tokens() {
        let old = codec("0123456789abcdef0123456789abcdef");
        let new = codec("fedcba9876543210fedcba9876543210");
        let token = old.encode(&identity());
        assert_eq!(new.decode(&token), Err(SessionError::Invalid));
    }

    #[test]
    fn stale_token_is_expired_not_invalid() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        let token = codec.seal(&Payload {
            identity: identity(),
            issued_at: Utc::now().timestamp() - 8 * 24 * 60 * 60,
        });
        assert_eq!(codec.decode(&token), Err(SessionError::Expired));
    }

    #[test]
    fn future_dated_token_is_rejected() {
        let codec = codec("0123456789abcdef0123456789abcdef");
        let token = codec.seal(&Payload {
            identity: identity(),
            issued_at: Utc::now().timestamp() + 3600,
        });
        assert_eq!(codec.decode(&token), Err(SessionError::Expired));
    }
}
