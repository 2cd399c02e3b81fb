//! Agent account identity
//!
//! SECURITY: the secret bytes live only inside [`Keypair`].
//! - Held in a `SecretBox`, zeroized on drop
//! - Never included in `Debug` output or logs
//! - Only leave this module through the key store, which needs them to persist

use crate::ledger::AccountId;
use crate::{Error, Result};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretBox};

/// Length of a secret key in bytes
pub const SECRET_KEY_LEN: usize = 32;

/// Public account id plus the private credential controlling it
pub struct Keypair {
    secret: SecretBox<[u8; SECRET_KEY_LEN]>,
    public: AccountId,
}

impl Keypair {
    /// Fresh keypair from the thread-local RNG
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Fresh keypair from a caller-supplied RNG
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self::from_secret_bytes(bytes)
    }

    /// Rebuild a keypair from its secret bytes
    pub fn from_secret_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        let public = AccountId::new(blake3::hash(&bytes).to_hex().to_string());
        Self {
            secret: SecretBox::new(Box::new(bytes)),
            public,
        }
    }

    /// Rebuild a keypair from a byte slice of the right length
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
            Error::KeyStore(format!(
                "secret key must be {} bytes, got {}",
                SECRET_KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::from_secret_bytes(bytes))
    }

    /// Public account id (safe to share)
    pub fn public_key(&self) -> &AccountId {
        &self.public
    }

    /// Keyed BLAKE3 tag over `message`, hex encoded
    pub fn sign(&self, message: &[u8]) -> String {
        blake3::keyed_hash(self.secret.expose_secret(), message)
            .to_hex()
            .to_string()
    }

    pub(crate) fn secret_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        self.secret.expose_secret()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn public_key_is_derived_from_secret() {
        let a = Keypair::from_secret_bytes([7u8; SECRET_KEY_LEN]);
        let b = Keypair::from_slice(&[7u8; SECRET_KEY_LEN]).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.public_key().as_str().len(), 64);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = Keypair::generate_with(&mut StdRng::seed_from_u64(9));
        let b = Keypair::generate_with(&mut StdRng::seed_from_u64(9));
        let c = Keypair::generate_with(&mut StdRng::seed_from_u64(10));
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            Keypair::from_slice(&[1u8; 16]),
            Err(Error::KeyStore(_))
        ));
    }

    #[test]
    fn signatures_depend_on_the_key() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_eq!(a.sign(b"payload"), a.sign(b"payload"));
        assert_ne!(a.sign(b"payload"), b.sign(b"payload"));
    }

    #[test]
    fn debug_redacts_secret() {
        let keypair = Keypair::from_secret_bytes([0xab; SECRET_KEY_LEN]);
        let debug_str = format!("{:?}", keypair);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("171, 171"));
    }
}
