use rand_core::RngCore;
use rug::{Assign, Complete, Integer};

/// Wraps any randomness source that implements [`rand_core::RngCore`] and makes
/// it compatible with [`rug::rand`].
pub fn external_rand(rng: &mut impl RngCore) -> rug::rand::ThreadRandState {
    use bytemuck::TransparentWrapper;

    #[derive(TransparentWrapper)]
    #[repr(transparent)]
    pub struct ExternalRand<R>(R);

    impl<R: RngCore> rug::rand::ThreadRandGen for ExternalRand<R> {
        fn gen(&mut self) -> u32 {
            self.0.next_u32()
        }
    }

    rug::rand::ThreadRandState::new_custom(ExternalRand::wrap_mut(rng))
}

/// Checks that `x` is in Z*_n
#[inline(always)]
pub fn in_mult_group(x: &Integer, n: &Integer) -> bool {
    x.cmp0().is_ge() && in_mult_group_abs(x, n)
}

/// Checks that `abs(x)` is in Z*_n
#[inline(always)]
pub fn in_mult_group_abs(x: &Integer, n: &Integer) -> bool {
    x.gcd_ref(n).complete() == *Integer::ONE
}

/// Samples `x` in Z*_n
pub fn sample_in_mult_group(rng: &mut impl RngCore, n: &Integer) -> Integer {
    let mut rng = external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(n.random_below_ref(&mut rng));
        if in_mult_group(&x, &n) {
            return x;
        }
    }
}

/// Generates a random safe prime
pub fn generate_safe_prime(rng: &mut impl RngCore, bits: u32) -> Integer {
    use rug::integer::IsPrime;
    let mut rng = external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(Integer::random_bits(bits - 1, &mut rng));
        x.set_bit(bits - 2, true);
        x <<= 1;
        x += 1;

        if let IsPrime::Yes | IsPrime::Probably = x.is_probably_prime(25) {
            return x;
        }
    }
}

/// Provides functionality that's yet missing in [`rug::Integer`]
pub trait IntegerExt {
    /// Returns `self mod module`
    fn modulo(&self, module: &Self) -> Self;
}

impl IntegerExt for Integer {
    fn modulo(&self, module: &Self) -> Self {
        let c = (self % module).complete();
        if c.cmp0().is_lt() {
            module + c
        } else {
            c
        }
    }
}

/// Returns `a mod n` in `[0, n)`, for possibly-negative `a`
pub fn posmod(a: &Integer, n: &Integer) -> Integer {
    a.modulo(n)
}

/// Samples a uniform integer in `[0, 2^bits)`
pub fn random_bits(rng: &mut impl RngCore, bits: u32) -> Integer {
    let mut rng = external_rand(rng);
    Integer::random_bits(bits, &mut rng).into()
}

/// Samples a uniform prime of exactly `bits` bits (top bit set)
pub fn random_prime(rng: &mut impl RngCore, bits: u32) -> Integer {
    use rug::integer::IsPrime;
    let mut rng = external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(Integer::random_bits(bits, &mut rng));
        x.set_bit(bits - 1, true);
        x.set_bit(0, true);

        if let IsPrime::Yes | IsPrime::Probably = x.is_probably_prime(25) {
            return x;
        }
    }
}

/// Samples a uniform element of `Z*_n`, i.e. coprime to `n`
pub fn random_coprime(rng: &mut impl RngCore, n: &Integer) -> Integer {
    sample_in_mult_group(rng, n)
}

/// Computes the modular inverse of `a` mod `n`, if it exists
pub fn mod_inverse(a: &Integer, n: &Integer) -> Option<Integer> {
    a.clone().invert(n).ok()
}

/// Computes the Jacobi symbol `(a/n)` for odd positive `n`
pub fn jacobi(a: &Integer, n: &Integer) -> i32 {
    a.jacobi(n)
}

/// Combines residues `x_p mod p` and `x_q mod q` into `x mod (p*q)` via CRT,
/// for coprime `p`, `q`
pub fn crt_combine(x_p: &Integer, p: &Integer, x_q: &Integer, q: &Integer) -> Integer {
    let pq: Integer = (p * q).complete();
    // q_inv = q^-1 mod p
    let q_inv: Integer = q
        .clone()
        .invert(p)
        .expect("p, q are coprime by construction");
    // h = (x_p - x_q) * q_inv mod p
    let diff: Integer = (x_p - x_q).complete();
    let h: Integer = (diff * q_inv).modulo(p);
    // x = x_q + h*q, reduced mod pq
    let x: Integer = x_q.clone() + h * q;
    x.modulo(&pq)
}

/// Computes `base^exp mod modulus` for a (possibly negative) `exp`, returning
/// `None` if `base` is not invertible mod `modulus` and `exp` is negative.
pub fn pow_mod(base: &Integer, exp: &Integer, modulus: &Integer) -> Option<Integer> {
    base.clone().pow_mod(exp, modulus).ok()
}

/// A fixed-exponent, known-factorization fast exponentiation scheme: given
/// `n = p*q`, precompute whatever a particular [`FactorizedExp`] impl needs to
/// answer `x ^ exponent mod modulus` faster than one big `pow_mod`.
pub trait FactorizedExp: Sized {
    /// Precomputes the context for `x ^ exponent mod modulus`, given `n`'s
    /// factors `p`, `q`. Returns `None` if the factorization doesn't support
    /// this scheme (e.g. `p == q`).
    fn build(exponent: &Integer, p: &Integer, q: &Integer) -> Option<Self>;

    /// Computes `base ^ exponent mod modulus` for the `exponent`/`modulus`
    /// fixed at [`FactorizedExp::build`] time.
    fn exp(&self, base: &Integer) -> Integer;
}

/// Computes `x ^ e mod m` via CRT over `m`'s two coprime factors (Garner's
/// algorithm), which is faster than a single big exponentiation once `m`'s
/// factorization is known. Used both to speed up Paillier encryption
/// (`x^N mod N^2`) and decryption (`x^lambda mod N^2`).
#[derive(Clone)]
pub struct CrtExp {
    pm: Integer,
    qm: Integer,
    /// Whether `exponent` was negative, in which case `base` must be inverted
    /// mod `pm*qm` before the positive part of the exponent is applied.
    invert_base: bool,
    e_mod_phi_pm: Integer,
    e_mod_phi_qm: Integer,
    /// `pm^-1 mod qm`, for Garner's CRT recombination.
    beta: Integer,
}

impl CrtExp {
    /// Builds a context for `x ^ exponent mod (p*q)`
    pub fn build_n(exponent: &Integer, p: &Integer, q: &Integer) -> Option<Self> {
        let phi_p = (p - Integer::ONE).complete();
        let phi_q = (q - Integer::ONE).complete();
        Self::build_inner(exponent, p.clone(), q.clone(), phi_p, phi_q)
    }

    /// Builds a context for `x ^ exponent mod (p*q)^2`
    pub fn build_nn(exponent: &Integer, p: &Integer, q: &Integer) -> Option<Self> {
        let pp = (p * p).complete();
        let qq = (q * q).complete();
        let phi_pp = (&pp - p).complete();
        let phi_qq = (&qq - q).complete();
        Self::build_inner(exponent, pp, qq, phi_pp, phi_qq)
    }

    fn build_inner(
        exponent: &Integer,
        pm: Integer,
        qm: Integer,
        phi_pm: Integer,
        phi_qm: Integer,
    ) -> Option<Self> {
        let invert_base = exponent.cmp0().is_lt();
        let e_abs = exponent.clone().abs();
        let e_mod_phi_pm = e_abs.clone().modulo(&phi_pm);
        let e_mod_phi_qm = e_abs.modulo(&phi_qm);
        let beta = pm.clone().modulo(&qm).invert(&qm).ok()?;
        Some(Self {
            pm,
            qm,
            invert_base,
            e_mod_phi_pm,
            e_mod_phi_qm,
            beta,
        })
    }
}

impl FactorizedExp for CrtExp {
    fn build(exponent: &Integer, p: &Integer, q: &Integer) -> Option<Self> {
        CrtExp::build_nn(exponent, p, q)
    }

    fn exp(&self, base: &Integer) -> Integer {
        let base = if self.invert_base {
            let modulus = (&self.pm * &self.qm).complete();
            base.clone()
                .invert(&modulus)
                .expect("base must be invertible mod pm*qm to raise it to a negative exponent")
        } else {
            base.clone()
        };

        let s1 = base.clone().modulo(&self.pm);
        let s2 = base.modulo(&self.qm);

        let r1 = s1
            .pow_mod(&self.e_mod_phi_pm, &self.pm)
            .expect("base reduced into [0, pm) and exponent nonnegative: always defined");
        let mut r2 = s2
            .pow_mod(&self.e_mod_phi_qm, &self.qm)
            .expect("base reduced into [0, qm) and exponent nonnegative: always defined");

        // Garner's CRT combination: x = r1 + pm * (((r2 - r1) * beta) mod qm)
        r2 -= &r1;
        r2 = r2.modulo(&self.qm);
        r2 *= &self.beta;
        r2 = r2.modulo(&self.qm);
        r2 *= &self.pm;
        r2 += &r1;

        let modulus = (&self.pm * &self.qm).complete();
        r2.modulo(&modulus)
    }
}
