//! The ElGamal cryptosystem: a multiplicative-homomorphic scheme over a
//! safe-prime subgroup of `Z_p*`. Not on the two-party comparison path (see
//! the comparison module); a standalone single-party primitive.

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};

use crate::ntl;
use crate::ntl::IntegerExt;

pub type Nonce = Integer;

/// ElGamal ciphertext: a pair `(c1, c2) = (g^r mod p, h^r * m mod p)` for
/// multiplicative ciphertexts, or `(g^r mod p, g^m * h^r mod p)` for the
/// exponential/additive variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub c1: Integer,
    pub c2: Integer,
}

/// ElGamal public key `(p, g, h, additive)`.
///
/// `additive` is fixed at construction: it selects whether [`PublicKey::encrypt`]
/// encodes the message in the exponent (requiring [`PrivateKey::decrypt`] to
/// brute-force a discrete log over a bounded plaintext space) or directly as
/// a group element (the standard multiplicative scheme). It is never mutated
/// after the key is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    p: Integer,
    g: Integer,
    h: Integer,
    additive: bool,
}

#[derive(Clone, Debug)]
pub struct PrivateKey {
    x: Integer,
    pk: PublicKey,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] Reason);

#[derive(Debug, thiserror::Error)]
enum Reason {
    #[error("key parameters are invalid")]
    InvalidParams,
    #[error("plaintext out of range")]
    Encrypt,
    #[error("decryption error")]
    Decrypt,
    #[error("homomorphic operation failed: invalid inputs")]
    Ops,
    #[error("message not found in the searched exponent range")]
    DiscreteLogNotFound,
}

impl PublicKey {
    /// Builds a multiplicative public key from `(p, g, h)`.
    pub fn new_multiplicative(p: Integer, g: Integer, h: Integer) -> Self {
        Self {
            p,
            g,
            h,
            additive: false,
        }
    }

    /// Builds an additive (exponential ElGamal) public key from `(p, g, h)`.
    pub fn new_additive(p: Integer, g: Integer, h: Integer) -> Self {
        Self {
            p,
            g,
            h,
            additive: true,
        }
    }

    pub fn p(&self) -> &Integer {
        &self.p
    }

    pub fn g(&self) -> &Integer {
        &self.g
    }

    pub fn h(&self) -> &Integer {
        &self.h
    }

    /// Whether this key encrypts additively (message in the exponent) or
    /// multiplicatively (message as a group element).
    pub fn additive(&self) -> bool {
        self.additive
    }

    /// Encrypts `m` with a fresh random nonce `r ∈ [1, p-1)`.
    pub fn encrypt(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        m: &Integer,
    ) -> Result<(Ciphertext, Nonce), Error> {
        let r = self.random_exponent(rng);
        let ciphertext = self.encrypt_with(m, &r)?;
        Ok((ciphertext, r))
    }

    /// Encrypts `m` with the given nonce `r`.
    pub fn encrypt_with(&self, m: &Integer, r: &Integer) -> Result<Ciphertext, Error> {
        let pm1: Integer = (&self.p - Integer::ONE).complete();
        if !self.additive && !(m.cmp0().is_gt() && *m < pm1) {
            return Err(Reason::Encrypt.into());
        }

        let c1 = self
            .g
            .clone()
            .pow_mod(r, &self.p)
            .map_err(|_| Reason::Encrypt)?;
        let s = self
            .h
            .clone()
            .pow_mod(r, &self.p)
            .map_err(|_| Reason::Encrypt)?;
        let c2 = if self.additive {
            let gm = self
                .g
                .clone()
                .pow_mod(m, &self.p)
                .map_err(|_| Reason::Encrypt)?;
            (gm * s).modulo(&self.p)
        } else {
            (m.clone() * s).modulo(&self.p)
        };
        Ok(Ciphertext { c1, c2 })
    }

    /// Homomorphic combination: multiplicative mode multiplies plaintexts;
    /// additive mode adds them (both homomorphisms are native to ElGamal's
    /// group-element representation).
    pub fn combine(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, Error> {
        if !ntl::in_mult_group_abs(&a.c1, &self.p) || !ntl::in_mult_group_abs(&b.c1, &self.p) {
            return Err(Reason::Ops.into());
        }
        Ok(Ciphertext {
            c1: (&a.c1 * &b.c1).complete().modulo(&self.p),
            c2: (&a.c2 * &b.c2).complete().modulo(&self.p),
        })
    }

    /// Re-randomizes a ciphertext in place of a fresh nonce; preserves the
    /// encrypted value.
    pub fn rerandomize(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        ciphertext: &Ciphertext,
    ) -> Result<Ciphertext, Error> {
        let r = self.random_exponent(rng);
        let blind_c1 = self
            .g
            .clone()
            .pow_mod(&r, &self.p)
            .map_err(|_| Reason::Ops)?;
        let blind_c2 = self
            .h
            .clone()
            .pow_mod(&r, &self.p)
            .map_err(|_| Reason::Ops)?;
        Ok(Ciphertext {
            c1: (ciphertext.c1.clone() * blind_c1).modulo(&self.p),
            c2: (ciphertext.c2.clone() * blind_c2).modulo(&self.p),
        })
    }

    fn random_exponent(&self, rng: &mut (impl RngCore + CryptoRng)) -> Integer {
        let pm1: Integer = (&self.p - Integer::ONE).complete();
        ntl::random_coprime(rng, &pm1)
    }
}

impl PrivateKey {
    /// Generates a fresh ElGamal keypair over a safe prime of `bits` bits.
    pub fn generate(
        rng: &mut (impl RngCore + CryptoRng),
        bits: u32,
        additive: bool,
    ) -> Result<Self, Error> {
        let p = ntl::generate_safe_prime(rng, bits);
        let pm1: Integer = (&p - Integer::ONE).complete();
        let g = ntl::random_coprime(rng, &p);
        let x = ntl::random_coprime(rng, &pm1);
        let h = g.clone().pow_mod(&x, &p).map_err(|_| Reason::InvalidParams)?;
        let pk = if additive {
            PublicKey::new_additive(p, g, h)
        } else {
            PublicKey::new_multiplicative(p, g, h)
        };
        Ok(Self { x, pk })
    }

    /// Constructs a private key from a known secret exponent `x` and public
    /// key.
    pub fn from_secret(x: Integer, pk: PublicKey) -> Self {
        Self { x, pk }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// Decrypts a ciphertext. In additive mode the plaintext must lie within
    /// `max_message` of zero, since decryption brute-forces a discrete log.
    pub fn decrypt(&self, c: &Ciphertext, max_message: Option<&Integer>) -> Result<Integer, Error> {
        let s = c
            .c1
            .clone()
            .pow_mod(&self.x, &self.pk.p)
            .map_err(|_| Reason::Decrypt)?;
        let s_inv = s.invert(&self.pk.p).map_err(|_| Reason::Decrypt)?;
        let plain_or_gm = (c.c2.clone() * s_inv).modulo(&self.pk.p);

        if !self.pk.additive {
            return Ok(plain_or_gm);
        }

        let bound = max_message.cloned().unwrap_or_else(|| Integer::from(1_000_000));
        let mut acc = Integer::from(1);
        let mut m = Integer::new();
        loop {
            if acc == plain_or_gm {
                return Ok(m);
            }
            if m >= bound {
                return Err(Reason::DiscreteLogNotFound.into());
            }
            m += Integer::ONE;
            acc = (acc * &self.pk.g).modulo(&self.pk.p);
        }
    }
}
