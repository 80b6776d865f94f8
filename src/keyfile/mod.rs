//! PEM/DER encoding for the public and private keys of every cryptosystem in
//! this crate: a `SubjectPublicKeyInfo`/PKCS#8 `PrivateKeyInfo` envelope
//! tagged with an algorithm OID for DGK, ElGamal, and Paillier, and a bare
//! `SEQUENCE` (no OID, no envelope) for Goldwasser–Micali.

mod der_codec;
mod dgk;
mod elgamal;
mod gm;
mod oid;
mod paillier;
mod pem;

pub use dgk::{dgk_private_from_pem, dgk_private_to_pem, dgk_public_from_pem, dgk_public_to_pem};
pub use elgamal::{elgamal_public_from_pem, elgamal_public_to_pem};
pub use gm::{gm_private_from_pem, gm_private_to_pem, gm_public_from_pem, gm_public_to_pem};
pub use paillier::{
    paillier_private_from_pem, paillier_private_to_pem, paillier_public_from_pem,
    paillier_public_to_pem, PaillierPrivateKey,
};

/// Errors loading or parsing a key file.
#[derive(Debug, thiserror::Error)]
pub enum KeyFileError {
    #[error("malformed PEM envelope")]
    InvalidPem,
    #[error("invalid base64 in PEM body")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("malformed DER")]
    InvalidDer,
    #[error("algorithm OID does not match the expected key type")]
    OidMismatch,
    #[error("decoded key material fails validation")]
    InvalidKeyMaterial,
}
