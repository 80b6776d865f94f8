use std::collections::HashMap;

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};

use crate::dgk::encryption_key::build_pow_lut;
use crate::dgk::{Ciphertext, EncryptionKey, Error, Params, Plaintext, Reason};
use crate::ntl;
use crate::ntl::IntegerExt;

/// Number of attempts to search for a prime `p = r*(u*v_p) + 1` (or
/// `q = r*v_q + 1`) of the requested bit length before giving up.
const KEYGEN_ATTEMPTS: u32 = 1 << 16;

/// DGK decryption key (secret)
#[derive(Clone)]
pub struct DecryptionKey {
    ek: EncryptionKey,
    p: Integer,
    q: Integer,
    v_p: Integer,
    v_q: Integer,
    /// `v = v_p * v_q`, the order of `h`
    v: Integer,
    /// Maps `(g^v_p)^i mod p -> i`, for `i` in `[0, u)`; the O(1) decryption
    /// table.
    dec_lut: HashMap<Integer, u32>,
}

impl DecryptionKey {
    /// Generates a DGK key for the given parameters
    pub fn generate(
        rng: &mut (impl RngCore + CryptoRng),
        params: Params,
    ) -> Result<Self, Error> {
        let u = ntl::random_prime(rng, params.ell + 3);
        let v_p = ntl::random_prime(rng, params.t);
        let v_q = ntl::random_prime(rng, params.t);

        let half_k = params.k / 2;
        let u_vp: Integer = (&u * &v_p).complete();
        let p = find_prime_congruent_to_one(rng, &u_vp, half_k)?;
        let q = find_prime_congruent_to_one(rng, &v_q, half_k)?;
        if p == q {
            return Err(Reason::InvalidParams.into());
        }

        let n: Integer = (&p * &q).complete();

        let g_p = find_generator(rng, &p, &u_vp, &[&u, &v_p])?;
        let g_q = find_generator(rng, &q, &v_q, &[&v_q])?;
        let g = ntl::crt_combine(&g_p, &p, &g_q, &q);

        let h_p = find_generator(rng, &p, &v_p, &[&v_p])?;
        let h_q = find_generator(rng, &q, &v_q, &[&v_q])?;
        let h = ntl::crt_combine(&h_p, &p, &h_q, &q);

        let ek = EncryptionKey::new(n, g, h, u.clone(), params);
        Self::from_parts(ek, p, q, v_p, v_q)
    }

    /// Assembles a decryption key from already-generated key material,
    /// (re)building the decryption lookup table.
    pub(crate) fn from_parts(
        ek: EncryptionKey,
        p: Integer,
        q: Integer,
        v_p: Integer,
        v_q: Integer,
    ) -> Result<Self, Error> {
        let v: Integer = (&v_p * &v_q).complete();
        let u32_u = ek.u().to_u32().ok_or(Reason::InvalidParams)?;

        // g restricted to mod p has order u*v_p; raising to v_p kills the
        // v_p factor and leaves an order-u generator of the subgroup we
        // decrypt in.
        let g_mod_p = ek.g().modulo(&p);
        let g_vp = g_mod_p
            .pow_mod(&v_p, &p)
            .map_err(|_| Reason::InvalidParams)?;
        let lut_values = build_pow_lut(&g_vp, &p, u32_u);

        let mut dec_lut = HashMap::with_capacity(u32_u as usize);
        for (i, value) in lut_values.into_iter().enumerate() {
            dec_lut.insert(value, i as u32);
        }

        Ok(Self {
            ek,
            p,
            q,
            v_p,
            v_q,
            v,
            dec_lut,
        })
    }

    /// Decrypts a ciphertext, returning the plaintext in `[0, u)`
    pub fn decrypt(&self, c: &Ciphertext) -> Result<Plaintext, Error> {
        if !ntl::in_mult_group(c, self.ek.n()) {
            return Err(Reason::Decrypt.into());
        }
        // c^v_p mod p == (g^m * h^r)^v_p mod p == (g^v_p)^m mod p, since h
        // has order v_p*v_q and is killed by the v_p power mod p.
        let c_mod_p = c.modulo(&self.p);
        let reduced = c_mod_p
            .pow_mod(&self.v_p, &self.p)
            .map_err(|_| Reason::Decrypt)?;
        self.dec_lut
            .get(&reduced)
            .copied()
            .ok_or(Reason::Decrypt.into())
    }

    /// Encrypts a plaintext `m` in `[0, u)` with `nonce` in `[0, n)`
    pub fn encrypt_with(&self, m: &Plaintext, nonce: &Integer) -> Result<Ciphertext, Error> {
        self.ek.encrypt_with(m, nonce)
    }

    /// Encrypts a plaintext `m` in `[0, u)`, sampling the nonce randomly
    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        m: &Plaintext,
    ) -> Result<(Ciphertext, Integer), Error> {
        self.ek.encrypt_with_random(rng, m)
    }

    /// Returns the (public) encryption key
    pub fn encryption_key(&self) -> EncryptionKey {
        self.ek.clone()
    }

    pub fn n(&self) -> &Integer {
        self.ek.n()
    }

    pub fn p(&self) -> &Integer {
        &self.p
    }

    pub fn q(&self) -> &Integer {
        &self.q
    }

    /// Order of `h` (i.e. `v_p * v_q`)
    pub fn v(&self) -> &Integer {
        &self.v
    }

    pub fn v_p(&self) -> &Integer {
        &self.v_p
    }

    pub fn v_q(&self) -> &Integer {
        &self.v_q
    }
}

/// Searches for a prime `p = r*base + 1` of exactly `bits` bits, for
/// increasing random `r`.
fn find_prime_congruent_to_one(
    rng: &mut impl RngCore,
    base: &Integer,
    bits: u32,
) -> Result<Integer, Error> {
    use rug::integer::IsPrime;

    for _ in 0..KEYGEN_ATTEMPTS {
        let r_bits = bits.saturating_sub(base.significant_bits());
        let r = ntl::random_bits(rng, r_bits.max(1));
        let candidate: Integer = (r * base).complete() + Integer::ONE;
        if candidate.significant_bits() != bits {
            continue;
        }
        if let IsPrime::Yes | IsPrime::Probably = candidate.is_probably_prime(25) {
            return Ok(candidate);
        }
    }
    Err(Reason::KeygenExhausted.into())
}

/// Searches for an element of `Z*_modulus` whose order is exactly
/// `target_order`, verified by checking it doesn't collapse to 1 when raised
/// to any `(target_order / prime_factor)` for each `prime_factor` of
/// `target_order` given in `factors`.
fn find_generator(
    rng: &mut impl RngCore,
    modulus: &Integer,
    target_order: &Integer,
    factors: &[&Integer],
) -> Result<Integer, Error> {
    let phi: Integer = (modulus - Integer::ONE).complete();
    let cofactor: Integer = phi.clone() / target_order;

    for _ in 0..KEYGEN_ATTEMPTS {
        let a = ntl::random_coprime(rng, modulus);
        let candidate = a
            .pow_mod(&cofactor, modulus)
            .map_err(|_| Reason::KeygenExhausted)?;
        if candidate == *Integer::ONE {
            continue;
        }
        let has_full_order = factors.iter().all(|&factor| {
            let partial_exp: Integer = target_order.clone() / factor;
            match candidate.clone().pow_mod(&partial_exp, modulus) {
                Ok(partial) => partial != *Integer::ONE,
                Err(_) => false,
            }
        });
        if has_full_order {
            return Ok(candidate);
        }
    }
    Err(Reason::KeygenExhausted.into())
}
