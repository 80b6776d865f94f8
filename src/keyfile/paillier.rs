//! Paillier key serialization.
//!
//! The private `SEQUENCE` (`key_size,n,n^2,λ,μ,g,α,ρ`) omits `p,q`: unlike
//! [`crate::paillier::DecryptionKey`], which is always built from the prime
//! factorization, a loaded key only has `(n, λ)` to work with. `μ`, `α`, `ρ`
//! are therefore recomputed from `(n, λ)` on load and checked against the
//! serialized values rather than trusted blindly, using the same plain
//! (non-CRT) modular exponentiation `smallest_divisor` uses internally
//! during key generation.

use rug::{Complete, Integer};

use crate::keyfile::der_codec::{self, Reader};
use crate::keyfile::{oid, pem, KeyFileError};
use crate::paillier::{smallest_divisor, EncryptionKey};

const PUBLIC_MARKER: &str = "PUBLIC KEY";
const PRIVATE_MARKER: &str = "PRIVATE KEY";

pub fn paillier_public_to_pem(ek: &EncryptionKey) -> String {
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(&Integer::from(ek.n().significant_bits())),
        der_codec::encode_integer(ek.n()),
        der_codec::encode_integer(ek.nn()),
        der_codec::encode_integer(&(ek.n() + Integer::ONE).complete()),
    ]);
    pem::wrap(PUBLIC_MARKER, &der_codec::encode_spki(oid::PAILLIER, &seq))
}

pub fn paillier_public_from_pem(input: &str) -> Result<EncryptionKey, KeyFileError> {
    let der = pem::unwrap(PUBLIC_MARKER, input)?;
    let inner = der_codec::decode_spki(&der, oid::PAILLIER)?;
    let mut seq = Reader::new(&inner).read_sequence()?;
    let _key_size = seq.read_integer()?;
    let n = seq.read_integer()?;
    let _nn = seq.read_integer()?;
    let _g = seq.read_integer()?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }
    Ok(EncryptionKey::from_n(n))
}

/// A Paillier private key reconstructed from `(n, λ)` alone, without the
/// prime factorization. Decrypts via the same plain modular-exponentiation
/// formula as [`crate::paillier::DecryptionKey`], just without its
/// CRT-accelerated fast path (which needs `p,q`).
pub struct PaillierPrivateKey {
    ek: EncryptionKey,
    lambda: Integer,
    mu: Integer,
    alpha: Integer,
    rho: Integer,
}

impl PaillierPrivateKey {
    /// Builds a serializable key from a full [`crate::paillier::DecryptionKey`]
    /// by dropping `p,q` and keeping only what the wire format carries.
    pub fn from_decryption_key(dk: &crate::paillier::DecryptionKey) -> Self {
        Self {
            ek: dk.encryption_key(),
            lambda: dk.lambda().clone(),
            mu: dk.u().clone(),
            alpha: dk.alpha().clone(),
            rho: dk.rho().clone(),
        }
    }

    pub fn encryption_key(&self) -> EncryptionKey {
        self.ek.clone()
    }

    pub fn n(&self) -> &Integer {
        self.ek.n()
    }

    pub fn lambda(&self) -> &Integer {
        &self.lambda
    }

    pub fn mu(&self) -> &Integer {
        &self.mu
    }

    pub fn alpha(&self) -> &Integer {
        &self.alpha
    }

    pub fn rho(&self) -> &Integer {
        &self.rho
    }

    /// Decrypts via plain (non-CRT) modular exponentiation: `a = c^λ mod n²`,
    /// `m = L(a)·μ mod n`, returned in the unsigned `[0, n)` convention.
    pub fn decrypt(&self, c: &Integer) -> Result<Integer, KeyFileError> {
        let a = c
            .clone()
            .pow_mod(&self.lambda, self.ek.nn())
            .map_err(|_| KeyFileError::InvalidKeyMaterial)?;
        let l = self.ek.l(&a).ok_or(KeyFileError::InvalidKeyMaterial)?;
        Ok((l * &self.mu) % self.ek.n())
    }
}

pub fn paillier_private_to_pem(key: &PaillierPrivateKey) -> String {
    let n = key.ek.n();
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(&Integer::from(n.significant_bits())),
        der_codec::encode_integer(n),
        der_codec::encode_integer(key.ek.nn()),
        der_codec::encode_integer(&key.lambda),
        der_codec::encode_integer(&key.mu),
        der_codec::encode_integer(&(n + Integer::ONE).complete()),
        der_codec::encode_integer(&key.alpha),
        der_codec::encode_integer(&key.rho),
    ]);
    pem::wrap(
        PRIVATE_MARKER,
        &der_codec::encode_pkcs8(oid::PAILLIER, &seq),
    )
}

pub fn paillier_private_from_pem(input: &str) -> Result<PaillierPrivateKey, KeyFileError> {
    let der = pem::unwrap(PRIVATE_MARKER, input)?;
    let inner = der_codec::decode_pkcs8(&der, oid::PAILLIER)?;
    let mut seq = Reader::new(&inner).read_sequence()?;
    let _key_size = seq.read_integer()?;
    let n = seq.read_integer()?;
    let _nn = seq.read_integer()?;
    let lambda = seq.read_integer()?;
    let mu = seq.read_integer()?;
    let _g = seq.read_integer()?;
    let alpha = seq.read_integer()?;
    let rho = seq.read_integer()?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }

    let ek = EncryptionKey::from_n(n);
    let t = (ek.n() + Integer::ONE).complete();
    let tt = t
        .pow_mod(&lambda, ek.nn())
        .map_err(|_| KeyFileError::InvalidKeyMaterial)?;
    let l_tt = ek.l(&tt).ok_or(KeyFileError::InvalidKeyMaterial)?;
    let expected_mu = l_tt
        .clone()
        .invert(ek.n())
        .map_err(|_| KeyFileError::InvalidKeyMaterial)?;
    let expected_rho = l_tt
        .invert(ek.nn())
        .map_err(|_| KeyFileError::InvalidKeyMaterial)?;
    let expected_alpha = smallest_divisor(&lambda);

    if mu != expected_mu || rho != expected_rho || alpha != expected_alpha {
        return Err(KeyFileError::InvalidKeyMaterial);
    }

    Ok(PaillierPrivateKey {
        ek,
        lambda,
        mu,
        alpha,
        rho,
    })
}
