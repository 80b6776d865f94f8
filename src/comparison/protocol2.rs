//! "Protocol 2": secure comparison of two ciphertexts Alice already holds,
//! reduced to a single Protocol 1 call. Alice learns `[x ≥ y]` under the
//! ORIGINAL/VEUGEN variants, `[x > y]` under JOYE; Bob learns nothing about
//! `x`/`y` beyond what is unavoidable when he is the one asked to decrypt
//! the final answer for Alice.

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};
use tracing::debug_span;

use crate::comparison::protocol1::{alice_protocol1_inner, bob_protocol1_inner};
use crate::comparison::{ops, AliceKeys, AliceSession, BobKeys, BobSession, ComparisonError, Variant};
use crate::transport::{Channel, Message};

/// Alice's half of Protocol 2, returning `Enc([x ≥ y])` (or `Enc([x > y])`
/// under JOYE) without a final decrypt round-trip — used internally by
/// outsourced division and Top-K, which need to keep the comparison bit
/// encrypted.
pub(crate) fn alice_protocol2_enc<Ch: Channel>(
    channel: &Ch,
    keys: &AliceKeys,
    rng: &mut (impl RngCore + CryptoRng),
    enc_x: &Integer,
    enc_y: &Integer,
    ell: u32,
    t: u32,
    variant: Variant,
) -> Result<Integer, ComparisonError> {
    // JOYE wants the strict `x > y`; compute it as `NOT [y >= x]` by
    // swapping the roles fed into the `2^ell + lhs - rhs` reduction below,
    // and negating the encrypted result at the end.
    let (lhs, rhs) = match variant {
        Variant::Joye => (enc_y, enc_x),
        _ => (enc_x, enc_y),
    };

    let two_pow_ell = Integer::from(1) << ell;
    let enc_offset = ops::encrypt_alice(keys, rng, &two_pow_ell)?;
    let diff = ops::subtract_alice(keys, lhs, rhs)?;
    let enc_z = ops::add_alice(keys, &diff, &enc_offset)?;

    let r = crate::ntl::random_bits(rng, ell + t);
    let enc_r = ops::encrypt_alice(keys, rng, &r)?;
    let enc_d = ops::add_alice(keys, &enc_z, &enc_r)?;
    channel.send(Message::BigInt(enc_d))?;

    let alpha = r.clone() & (two_pow_ell.clone() - Integer::ONE);
    let r_hi: Integer = r >> ell;

    // The borrow-correction sub-comparison always runs plain `<=`
    // regardless of the outer variant; JOYE's strictness is applied above
    // by swapping operands, not by changing this inner comparison.
    let alpha_le_beta = alice_protocol1_inner(channel, keys, rng, &alpha, ell, Variant::Original)?;

    let enc_d_hi = channel.recv()?.into_big_int()?;
    let borrow = if alpha_le_beta { 0 } else { 1 };
    let correction: Integer = r_hi + Integer::from(borrow);
    let enc_correction = ops::encrypt_alice(keys, rng, &correction)?;
    let mut enc_ge = ops::subtract_alice(keys, &enc_d_hi, &enc_correction)?;

    if matches!(variant, Variant::Joye) {
        let enc_one = ops::encrypt_alice(keys, rng, &Integer::from(1))?;
        enc_ge = ops::subtract_alice(keys, &enc_one, &enc_ge)?;
    }

    Ok(enc_ge)
}

/// Bob's half of Protocol 2's encrypted-result reduction.
pub(crate) fn bob_protocol2_enc<Ch: Channel>(
    channel: &Ch,
    keys: &BobKeys,
    rng: &mut (impl RngCore + CryptoRng),
    ell: u32,
) -> Result<(), ComparisonError> {
    let enc_d = channel.recv()?.into_big_int()?;
    let d = ops::decrypt(keys, &enc_d)?;

    let two_pow_ell = Integer::from(1) << ell;
    let beta = (&d % &two_pow_ell).complete();
    let d_hi: Integer = d >> ell;

    bob_protocol1_inner(channel, keys, rng, &beta, ell)?;

    let enc_d_hi = ops::encrypt_bob(keys, rng, &d_hi)?;
    channel.send(Message::BigInt(enc_d_hi))?;
    Ok(())
}

/// Alice's half of Protocol 2: learns the plaintext comparison bit via one
/// additional round-trip in which Bob decrypts the (re-randomized) result.
pub fn alice_protocol2<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    enc_x: &Integer,
    enc_y: &Integer,
) -> Result<bool, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("protocol2", role = "alice").entered();
    let config = session.config;
    let ell = config.dgk_params.ell;
    let t = config.dgk_params.t;
    let result = (|| {
        let enc_ge = alice_protocol2_enc(
            &session.channel,
            &session.keys,
            rng,
            enc_x,
            enc_y,
            ell,
            t,
            config.variant,
        )?;
        let blinded = ops::rerandomize_alice(&session.keys, rng, &enc_ge)?;
        session.channel.send(Message::BigInt(blinded))?;
        let bit = session.channel.recv()?.into_bool()?;
        Ok(bit)
    })();
    session.finish(result)
}

/// Bob's half of Protocol 2.
pub fn bob_protocol2<Ch: Channel>(
    session: &mut BobSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("protocol2", role = "bob").entered();
    let config = session.config;
    let ell = config.dgk_params.ell;
    let result = (|| {
        bob_protocol2_enc(&session.channel, &session.keys, rng, ell)?;
        let enc_ge = session.channel.recv()?.into_big_int()?;
        let ge = ops::decrypt(&session.keys, &enc_ge)?;
        session.channel.send(Message::Bool(ge == 1))?;
        Ok(())
    })();
    session.finish(result)
}
