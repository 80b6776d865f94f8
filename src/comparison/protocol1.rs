//! DGK "Protocol 1": secure bitwise comparison. Alice holds plaintext `x`,
//! Bob holds plaintext `y`, both know the bit length `ℓ`; Alice learns the
//! single bit `δ = [x ≤ y]` (or `[x < y]` under the JOYE variant), Bob
//! learns nothing.
//!
//! The scan/blind/permute construction only needs `Encrypt`, `Add`,
//! `Subtract` and `ScalarMultiply` from the active scheme, so it is written
//! generically over [`Mode`](crate::comparison::Mode) via [`ops`] rather
//! than hard-wired to DGK — Protocol 2 reduces an encrypted Paillier
//! comparison to one Protocol 1 call without a second keypair.

use rand_core::{CryptoRng, RngCore};
use rug::Integer;
use tracing::{debug, debug_span};

use crate::comparison::ops;
use crate::comparison::{AliceKeys, AliceSession, BobKeys, BobSession, ComparisonError, Variant};
use crate::transport::{Channel, Message};

/// Decomposes `x` into its `ell` least-significant bits, bit 0 first.
fn bits_le(x: &Integer, ell: u32) -> Vec<u32> {
    (0..ell).map(|i| x.get_bit(i) as u32).collect()
}

/// Alice's half of Protocol 1. `rng` is used to pick the random permutation
/// scalars and the per-entry blinding factors.
pub fn alice_protocol1<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    x: &Integer,
) -> Result<bool, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("protocol1", role = "alice").entered();
    let config = session.config;
    let ell = config.dgk_params.ell;
    let result = alice_protocol1_inner(&session.channel, &session.keys, rng, x, ell, config.variant);
    session.finish(result)
}

pub(crate) fn alice_protocol1_inner<Ch: Channel>(
    channel: &Ch,
    keys: &AliceKeys,
    rng: &mut (impl RngCore + CryptoRng),
    x: &Integer,
    ell: u32,
    variant: Variant,
) -> Result<bool, ComparisonError> {
    if x.cmp0().is_lt() || x.significant_bits() > ell {
        return Err(ComparisonError::PlaintextOutOfRange);
    }

    let x_bits = bits_le(x, ell);

    let enc_y = channel.recv()?.into_big_int_array()?;
    if enc_y.len() != ell as usize {
        return Err(ComparisonError::ProtocolMismatch(
            "wrong bit-vector length from Bob",
        ));
    }

    let one = ops::encrypt_alice(keys, rng, &Integer::from(1))?;

    // c_i = Enc(x_i) XOR-homomorphically combined with E(y_i):
    // c_i = Enc(x_i) + E(y_i) - 2*x_i*E(y_i)
    let mut xor_bits = Vec::with_capacity(ell as usize);
    for i in 0..ell as usize {
        let enc_xi = ops::encrypt_alice(keys, rng, &Integer::from(x_bits[i]))?;
        let term = ops::scalar_multiply_alice(keys, &Integer::from(2 * x_bits[i]), &enc_y[i])?;
        let c = ops::add_alice(keys, &enc_xi, &enc_y[i])?;
        let c = ops::subtract_alice(keys, &c, &term)?;
        xor_bits.push(c);
    }

    // Scan, walking MSB-down so the suffix sum accumulates higher-order XOR
    // bits first: at the most significant differing bit, the zero entry
    // pins down which side is strictly greater there. ORIGINAL/VEUGEN use
    // s_i = Enc(1 + y_i - x_i + 3*sum_{j>i} xor_j), whose zero entry marks
    // `x > y` strictly — equal inputs never zero, so "no zero found" below
    // is negated into the inclusive `x <= y`. JOYE flips the two terms
    // (s_i = Enc(1 + x_i - y_i + 3*sum_{j>i} xor_j)), whose zero entry
    // marks `x < y` strictly and is reported as-is, so equal inputs
    // correctly yield `false`.
    let joye = matches!(variant, Variant::Joye);
    let mut suffix_sum: Option<Integer> = None;
    let mut scan = Vec::with_capacity(ell as usize);
    for i in (0..ell as usize).rev() {
        let mut s = one.clone();
        let enc_xi = ops::encrypt_alice(keys, rng, &Integer::from(x_bits[i]))?;
        if joye {
            s = ops::add_alice(keys, &s, &enc_xi)?;
            s = ops::subtract_alice(keys, &s, &enc_y[i])?;
        } else {
            s = ops::add_alice(keys, &s, &enc_y[i])?;
            s = ops::subtract_alice(keys, &s, &enc_xi)?;
        }
        if let Some(sum) = &suffix_sum {
            let term = ops::scalar_multiply_alice(keys, &Integer::from(3), sum)?;
            s = ops::add_alice(keys, &s, &term)?;
        }
        scan.push(s);
        suffix_sum = Some(match suffix_sum {
            Some(sum) => ops::add_alice(keys, &sum, &xor_bits[i])?,
            None => xor_bits[i].clone(),
        });
    }

    debug!(ell, ?variant, "scan built");

    // Permute and blind each scan entry by an independent nonzero r_i.
    let modulus = ops::modulus_alice(keys);
    let mut order: Vec<usize> = (0..ell as usize).collect();
    shuffle(&mut order, rng);
    let mut blinded = Vec::with_capacity(ell as usize);
    for &idx in &order {
        let r = nonzero_scalar(rng, &modulus);
        blinded.push(ops::scalar_multiply_alice(keys, &r, &scan[idx])?);
    }

    channel.send(Message::BigIntArray(blinded))?;

    // Bob decrypts the blinded scan and reports the bit directly: nothing
    // further needs hiding from Alice, who is the intended learner of δ'.
    // `delta_prime` is `[x > y]` for ORIGINAL/VEUGEN (negate for the
    // inclusive `x <= y`) and already `[x < y]` for JOYE.
    let delta_prime = channel.recv()?.into_bool()?;

    Ok(match variant {
        Variant::Joye => delta_prime,
        _ => !delta_prime,
    })
}

/// Bob's half of Protocol 1.
pub fn bob_protocol1<Ch: Channel>(
    session: &mut BobSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    y: &Integer,
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("protocol1", role = "bob").entered();
    let config = session.config;
    let ell = config.dgk_params.ell;
    let result = bob_protocol1_inner(&session.channel, &session.keys, rng, y, ell);
    session.finish(result)
}

pub(crate) fn bob_protocol1_inner<Ch: Channel>(
    channel: &Ch,
    keys: &BobKeys,
    rng: &mut (impl RngCore + CryptoRng),
    y: &Integer,
    ell: u32,
) -> Result<(), ComparisonError> {
    if y.cmp0().is_lt() || y.significant_bits() > ell {
        return Err(ComparisonError::PlaintextOutOfRange);
    }

    let y_bits = bits_le(y, ell);
    let mut enc_y = Vec::with_capacity(ell as usize);
    for &bit in &y_bits {
        enc_y.push(ops::encrypt_bob(keys, rng, &Integer::from(bit))?);
    }
    channel.send(Message::BigIntArray(enc_y))?;

    let blinded = channel.recv()?.into_big_int_array()?;
    if blinded.len() != ell as usize {
        return Err(ComparisonError::ProtocolMismatch(
            "wrong blinded-scan length from Alice",
        ));
    }

    let mut delta_prime = false;
    for c in &blinded {
        if ops::decrypt(keys, c)? == 0 {
            delta_prime = true;
            break;
        }
    }
    channel.send(Message::Bool(delta_prime))?;
    Ok(())
}

fn shuffle(order: &mut [usize], rng: &mut impl RngCore) {
    for i in (1..order.len()).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        order.swap(i, j);
    }
}

fn nonzero_scalar(rng: &mut impl RngCore, modulus: &Integer) -> Integer {
    loop {
        let r = crate::ntl::random_bits(rng, modulus.significant_bits()) % modulus;
        if r != 0 {
            return r;
        }
    }
}
