//! The standard Paillier cryptosystem: additively homomorphic encryption over `Z_n`.
//!
//! This module keeps the fast, CRT-accelerated encryption/decryption key pair
//! design, and adds the pieces the comparison protocols in [`crate::comparison`]
//! need on top: an unsigned `[0, n)` plaintext convention, re-randomization,
//! and the Damgård–Jurik fast-variant fields (`alpha`, `rho`).

mod decryption_key;
mod encryption_key;
pub mod plaintext;

#[cfg(feature = "serde")]
mod serde;

use rug::Integer;

pub type Ciphertext = Integer;
pub type Nonce = Integer;

/// A plaintext in the *signed* convention `{-N/2, .., N/2}`, as produced by
/// [`EncryptionKey::encrypt_with`] and [`DecryptionKey::decrypt`].
pub type Plaintext = Integer;

pub use self::{decryption_key::DecryptionKey, encryption_key::EncryptionKey, plaintext::Unsigned};

/// Exposed crate-internally for [`crate::keyfile`], which recomputes `alpha`
/// from a loaded `lambda` the same way key generation derives it.
pub(crate) use self::decryption_key::smallest_divisor;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] Reason);

#[derive(Debug, thiserror::Error)]
enum Reason {
    #[error("p,q are invalid")]
    InvalidPQ,
    #[error("encryption error")]
    Encrypt,
    #[error("decryption error")]
    Decrypt,
    #[error("homorphic operation failed: invalid inputs")]
    Ops,
    #[error("could not build fast-exponentiation table")]
    BuildFastExp,
    #[error("bug occurred")]
    Bug(#[source] Bug),
}

#[derive(Debug, thiserror::Error)]
enum Bug {
    #[error("pow mod undefined")]
    PowModUndef,
    #[error("could not construct faster encryption")]
    NewFasterEncrypt,
}

impl From<Bug> for Error {
    fn from(err: Bug) -> Self {
        Error(Reason::Bug(err))
    }
}
