use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};

use crate::dgk::{Ciphertext, Error, Nonce, Params, Plaintext, Reason};
use crate::ntl;

/// DGK encryption key (public)
#[derive(Clone, Debug)]
pub struct EncryptionKey {
    n: Integer,
    g: Integer,
    h: Integer,
    u: Integer,
    params: Params,
    /// `g_lut[i] = g^i mod n`, for `i` in `[0, u)`
    g_lut: Vec<Integer>,
}

impl EncryptionKey {
    pub(crate) fn new(n: Integer, g: Integer, h: Integer, u: Integer, params: Params) -> Self {
        let g_lut = build_pow_lut(&g, &n, u.to_u32().expect("u fits ell+3 <= 35 bits"));
        Self {
            n,
            g,
            h,
            u,
            params,
            g_lut,
        }
    }

    /// The DGK modulus `n = p*q`
    pub fn n(&self) -> &Integer {
        &self.n
    }

    /// Generator of the order-`u*v_p*v_q` subgroup
    pub fn g(&self) -> &Integer {
        &self.g
    }

    /// Generator of the order-`v_p*v_q` subgroup, used to rerandomize
    pub fn h(&self) -> &Integer {
        &self.h
    }

    /// The plaintext modulus: plaintexts live in `Z_u`
    pub fn u(&self) -> &Integer {
        &self.u
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Encrypts plaintext `m` in `[0, u)` with `nonce` in `[0, n)`
    ///
    /// `Enc(m, r) = g^m * h^r mod n`
    pub fn encrypt_with(&self, m: &Plaintext, nonce: &Nonce) -> Result<Ciphertext, Error> {
        let u = self.u.to_u32().expect("u fits in u32");
        if *m >= u {
            return Err(Reason::Encrypt.into());
        }
        let gm = &self.g_lut[*m as usize];
        let hr = self
            .h
            .clone()
            .pow_mod(nonce, &self.n)
            .map_err(|_| Reason::Encrypt)?;
        Ok((gm * hr).complete() % &self.n)
    }

    /// Encrypts plaintext `m` in `[0, u)`, sampling the nonce uniformly from
    /// `[0, 2^(2t))` per the declared ciphertext randomness space
    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        m: &Plaintext,
    ) -> Result<(Ciphertext, Nonce), Error> {
        let nonce = ntl::random_bits(rng, 2 * self.params.t);
        let ciphertext = self.encrypt_with(m, &nonce)?;
        Ok((ciphertext, nonce))
    }

    /// Homomorphic addition: `add(Enc(a), Enc(b)) = Enc(a + b mod u)`
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, Error> {
        if !ntl::in_mult_group(c1, &self.n) || !ntl::in_mult_group(c2, &self.n) {
            return Err(Reason::Ops.into());
        }
        Ok((c1 * c2).complete() % &self.n)
    }

    /// Homomorphic subtraction: `subtract(Enc(a), Enc(b)) = Enc(a - b mod u)`
    pub fn subtract(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, Error> {
        let neg_one: Integer = (&self.u - Integer::ONE).complete();
        let neg_c2 = self.scalar_multiply(&neg_one, c2)?;
        self.add(c1, &neg_c2)
    }

    /// Homomorphic scalar multiplication: `scalar_multiply(a, Enc(b)) = Enc(a*b mod u)`
    pub fn scalar_multiply(
        &self,
        scalar: &Integer,
        ciphertext: &Ciphertext,
    ) -> Result<Ciphertext, Error> {
        if !ntl::in_mult_group(ciphertext, &self.n) {
            return Err(Reason::Ops.into());
        }
        Ok(ciphertext
            .clone()
            .pow_mod(scalar, &self.n)
            .map_err(|_| Reason::Ops)?)
    }

    /// Re-randomizes a ciphertext by multiplying in `h^r` for a fresh random
    /// `r` in `[0, 2^(2t))`; preserves the encrypted plaintext
    pub fn rerandomize(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        ciphertext: &Ciphertext,
    ) -> Result<Ciphertext, Error> {
        let r = ntl::random_bits(rng, 2 * self.params.t);
        let hr = self
            .h
            .clone()
            .pow_mod(&r, &self.n)
            .map_err(|_| Reason::Ops)?;
        Ok((ciphertext * hr).complete() % &self.n)
    }
}

/// Builds `[base^0, base^1, .., base^(count-1)] mod modulus`
pub(crate) fn build_pow_lut(base: &Integer, modulus: &Integer, count: u32) -> Vec<Integer> {
    let mut lut = Vec::with_capacity(count as usize);
    let mut acc = Integer::from(1);
    for _ in 0..count {
        lut.push(acc.clone());
        acc = (acc * base).complete() % modulus;
    }
    lut
}
