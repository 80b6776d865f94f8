//! The comparison protocols in [`crate::comparison`] speak of Paillier
//! plaintexts as nonnegative residues in `[0, n)`, per the data model's
//! invariant, while [`super::EncryptionKey`]/[`super::DecryptionKey`] use the
//! signed `{-N/2, .., N/2}` convention that makes the fast-path arithmetic
//! simplest. `Unsigned` bridges the two without duplicating any arithmetic.

use rug::{Complete, Integer};

use crate::paillier::EncryptionKey;

/// A Paillier plaintext in the unsigned convention `[0, n)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unsigned(Integer);

impl Unsigned {
    /// Wraps `m`, reducing it into `[0, n)` first
    pub fn new(ek: &EncryptionKey, m: Integer) -> Self {
        Self(crate::ntl::posmod(&m, ek.n()))
    }

    /// Converts from the encryption key's signed convention `{-N/2, .., N/2}`
    pub fn from_signed(ek: &EncryptionKey, signed: &Integer) -> Self {
        Self(crate::ntl::posmod(signed, ek.n()))
    }

    /// Converts into the encryption key's signed convention `{-N/2, .., N/2}`
    pub fn to_signed(&self, ek: &EncryptionKey) -> Integer {
        if (Integer::from(&self.0 << 1)) >= *ek.n() {
            (&self.0 - ek.n()).complete()
        } else {
            self.0.clone()
        }
    }

    /// The underlying value in `[0, n)`
    pub fn as_integer(&self) -> &Integer {
        &self.0
    }

    pub fn into_integer(self) -> Integer {
        self.0
    }
}
