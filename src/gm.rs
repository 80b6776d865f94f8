//! The Goldwasser–Micali cryptosystem: bit-wise probabilistic encryption
//! with an XOR-homomorphic ciphertext combine. Not on the two-party
//! comparison path; a standalone single-party primitive.

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};

use crate::ntl;

pub type Ciphertext = Integer;
pub type Nonce = Integer;

/// Goldwasser–Micali public key: modulus `n = p*q` and a quadratic
/// non-residue `y` with Jacobi symbol `+1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    n: Integer,
    y: Integer,
}

#[derive(Clone, Debug)]
pub struct PrivateKey {
    p: Integer,
    q: Integer,
    pk: PublicKey,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] Reason);

#[derive(Debug, thiserror::Error)]
enum Reason {
    #[error("key parameters are invalid")]
    InvalidParams,
    #[error("exhausted retry budget searching for a quadratic non-residue")]
    KeygenExhausted,
    #[error("decryption error")]
    Decrypt,
    #[error("homomorphic operation failed: invalid inputs")]
    Ops,
}

impl PublicKey {
    /// Rebuilds a public key from its raw `(n, y)` components, e.g. when
    /// loading one from [`crate::keyfile`]. Does not re-verify that `y` is a
    /// quadratic non-residue of Jacobi symbol `+1`.
    pub(crate) fn from_parts(n: Integer, y: Integer) -> Self {
        Self { n, y }
    }

    pub fn n(&self) -> &Integer {
        &self.n
    }

    pub fn y(&self) -> &Integer {
        &self.y
    }

    /// Encrypts a single bit: `Enc(0, r) = r^2 mod n`, `Enc(1, r) = y*r^2 mod n`,
    /// for random `r ∈ Z*_n`.
    pub fn encrypt_bit(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        bit: bool,
    ) -> Result<(Ciphertext, Nonce), Error> {
        let r = ntl::sample_in_mult_group(rng, &self.n);
        let ciphertext = self.encrypt_bit_with(bit, &r)?;
        Ok((ciphertext, r))
    }

    /// Encrypts a single bit with the given nonce `r`.
    pub fn encrypt_bit_with(&self, bit: bool, r: &Nonce) -> Result<Ciphertext, Error> {
        if !ntl::in_mult_group(r, &self.n) {
            return Err(Reason::Ops.into());
        }
        let rr = (r * r).complete() % &self.n;
        let c = if bit { (rr * &self.y) % &self.n } else { rr };
        Ok(c)
    }

    /// XOR-homomorphic combine: `xor(Enc(a), Enc(b)) = Enc(a XOR b)`.
    pub fn xor(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, Error> {
        if !ntl::in_mult_group(a, &self.n) || !ntl::in_mult_group(b, &self.n) {
            return Err(Reason::Ops.into());
        }
        Ok((a * b).complete() % &self.n)
    }
}

impl PrivateKey {
    /// Generates a fresh Goldwasser–Micali keypair from two `bits/2`-bit
    /// safe primes.
    pub fn generate(rng: &mut (impl RngCore + CryptoRng), bits: u32) -> Result<Self, Error> {
        let p = ntl::generate_safe_prime(rng, bits / 2);
        let q = ntl::generate_safe_prime(rng, bits / 2);
        Self::from_primes(rng, p, q)
    }

    /// Constructs a keypair from known primes `p`, `q`, searching for a
    /// quadratic non-residue `y` of Jacobi symbol `+1`.
    pub fn from_primes(
        rng: &mut (impl RngCore + CryptoRng),
        p: Integer,
        q: Integer,
    ) -> Result<Self, Error> {
        if p == q {
            return Err(Reason::InvalidParams.into());
        }
        let n: Integer = (&p * &q).complete();

        const ATTEMPTS: u32 = 1 << 16;
        for _ in 0..ATTEMPTS {
            let y = ntl::sample_in_mult_group(rng, &n);
            if ntl::jacobi(&y, &n) != 1 {
                continue;
            }
            // Jacobi symbol +1 with non-residue mod p (equivalently mod q,
            // since the product of two Jacobi-symbol-wrt-p,q values is the
            // Jacobi symbol wrt n) is witnessed by y not being a QR mod p.
            if !is_quadratic_residue(&y, &p) {
                let pk = PublicKey { n, y };
                return Ok(Self { p, q, pk });
            }
        }
        Err(Reason::KeygenExhausted.into())
    }

    /// Rebuilds a private key from known primes and an already-derived
    /// public key, e.g. when loading one from [`crate::keyfile`].
    pub(crate) fn from_parts(p: Integer, q: Integer, pk: PublicKey) -> Self {
        Self { p, q, pk }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn p(&self) -> &Integer {
        &self.p
    }

    pub fn q(&self) -> &Integer {
        &self.q
    }

    /// Decrypts a single bit by testing quadratic residuosity mod `p`.
    pub fn decrypt_bit(&self, c: &Ciphertext) -> Result<bool, Error> {
        if !ntl::in_mult_group(c, &self.pk.n) {
            return Err(Reason::Decrypt.into());
        }
        Ok(!is_quadratic_residue(c, &self.p))
    }
}

/// Whether `a` is a quadratic residue mod the prime `p`, via the Jacobi
/// (here: Legendre) symbol.
fn is_quadratic_residue(a: &Integer, p: &Integer) -> bool {
    ntl::jacobi(a, p) == 1
}
