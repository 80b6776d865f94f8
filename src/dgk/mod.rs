//! The DGK (Damgård–Geisler–Krøigaard) cryptosystem: an additively homomorphic
//! scheme purpose-built for bit-oriented comparison, with a small plaintext
//! space `Z_u` and O(1) table-based decryption.

mod decryption_key;
mod encryption_key;
mod params;

#[cfg(feature = "serde")]
mod serde;

use rug::Integer;

pub type Ciphertext = Integer;
pub type Nonce = Integer;

/// A DGK plaintext, an element of `Z_u`. `u` is typically 18-19 bits, so a
/// `u32` always has room for it.
pub type Plaintext = u32;

pub use self::{decryption_key::DecryptionKey, encryption_key::EncryptionKey, params::Params};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] Reason);

#[derive(Debug, thiserror::Error)]
enum Reason {
    #[error("key parameters are invalid")]
    InvalidParams,
    #[error("exhausted retry budget searching for key material")]
    KeygenExhausted,
    #[error("plaintext out of range")]
    Encrypt,
    #[error("ciphertext malformed or decryption lookup miss")]
    Decrypt,
    #[error("homomorphic operation failed: invalid inputs")]
    Ops,
}
