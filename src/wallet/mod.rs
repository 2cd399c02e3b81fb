//! Agent account identities and their storage
//!
//! Secret key material never leaves this module except to be persisted by a
//! [`KeyStore`].

mod keystore;
mod signer;

pub use keystore::{FileKeyStore, KeyStore, MemoryKeyStore};
pub use signer::{Keypair, SECRET_KEY_LEN};
