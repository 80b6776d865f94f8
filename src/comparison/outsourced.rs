//! Outsourced multiplication (`Enc(x*y)` from `Enc(x), Enc(y)`) and
//! outsourced division (`Enc(⌊x/d⌋)` from `Enc(x)` and an Alice-chosen
//! public `d > 0`), both driven by one blind-decrypt-reencrypt round trip
//! to Bob plus, for division, a Protocol 1 call to correct the borrow at
//! the divisor boundary.

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};
use tracing::debug_span;

use crate::comparison::protocol1::{alice_protocol1_inner, bob_protocol1_inner};
use crate::comparison::{ops, AliceSession, BobSession, ComparisonError, Variant};
use crate::transport::{Channel, Message};

/// Alice's half of outsourced multiplication.
pub fn alice_multiply<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    enc_x: &Integer,
    enc_y: &Integer,
) -> Result<Integer, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("outsourced_multiply", role = "alice").entered();
    let result = (|| {
        let keys = &session.keys;
        let modulus = ops::modulus_alice(keys);
        let r_x = crate::ntl::random_bits(rng, modulus.significant_bits()) % &modulus;
        let r_y = crate::ntl::random_bits(rng, modulus.significant_bits()) % &modulus;

        let enc_rx = ops::encrypt_alice(keys, rng, &r_x)?;
        let enc_ry = ops::encrypt_alice(keys, rng, &r_y)?;
        let blind_x = ops::add_alice(keys, enc_x, &enc_rx)?;
        let blind_y = ops::add_alice(keys, enc_y, &enc_ry)?;
        session
            .channel
            .send(Message::BigIntArray(vec![blind_x, blind_y]))?;

        let enc_product = session.channel.recv()?.into_big_int()?;

        // Enc(xy) = Enc((x+r_x)(y+r_y)) - r_y*Enc(x) - r_x*Enc(y) - Enc(r_x*r_y)
        let term_x = ops::scalar_multiply_alice(keys, &r_y, enc_x)?;
        let term_y = ops::scalar_multiply_alice(keys, &r_x, enc_y)?;
        let cross = (&r_x * &r_y).complete() % &modulus;
        let enc_cross = ops::encrypt_alice(keys, rng, &cross)?;

        let mut result = ops::subtract_alice(keys, &enc_product, &term_x)?;
        result = ops::subtract_alice(keys, &result, &term_y)?;
        result = ops::subtract_alice(keys, &result, &enc_cross)?;
        Ok(result)
    })();
    session.finish(result)
}

/// Bob's half of outsourced multiplication.
pub fn bob_multiply<Ch: Channel>(
    session: &mut BobSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("outsourced_multiply", role = "bob").entered();
    let result = (|| {
        let keys = &session.keys;
        let blinded = session.channel.recv()?.into_big_int_array()?;
        let [blind_x, blind_y] = <[Integer; 2]>::try_from(blinded).map_err(|_| {
            ComparisonError::ProtocolMismatch("expected exactly 2 blinded ciphertexts")
        })?;

        let a = ops::decrypt(keys, &blind_x)?;
        let b = ops::decrypt(keys, &blind_y)?;
        let modulus = ops::modulus_bob(keys);
        let product = (&a * &b).complete() % &modulus;

        let enc_product = ops::encrypt_bob(keys, rng, &product)?;
        session.channel.send(Message::BigInt(enc_product))?;
        Ok(())
    })();
    session.finish(result)
}

/// Alice's half of outsourced division by a public divisor `d > 0`.
pub fn alice_divide<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    enc_x: &Integer,
    d: &Integer,
) -> Result<Integer, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("outsourced_divide", role = "alice").entered();
    let ell = session.config.dgk_params.ell;
    let result = (|| {
        if d.cmp0().is_le() {
            return Err(ComparisonError::PlaintextOutOfRange);
        }
        let keys = &session.keys;
        let modulus = ops::modulus_alice(keys);
        let r = crate::ntl::random_bits(rng, modulus.significant_bits()) % &modulus;

        let enc_r = ops::encrypt_alice(keys, rng, &r)?;
        let blinded = ops::add_alice(keys, enc_x, &enc_r)?;
        session.channel.send(Message::BigInt(blinded))?;
        session.channel.send(Message::BigInt(d.clone()))?;

        let enc_quotient = session.channel.recv()?.into_big_int()?;

        let r_div_d: Integer = r.clone() / d;
        let r_mod_d: Integer = (&r % d).complete();

        // Borrow occurs iff (x mod d) + (r mod d) >= d, equivalently iff
        // Bob's w = (x+r) mod d wraps below r_mod_d — the same mod-boundary
        // identity Protocol 2 uses with `d` in place of `2^ell`.
        let r_mod_d_le_w = alice_protocol1_inner(&session.channel, keys, rng, &r_mod_d, ell, Variant::Original)?;
        let borrow = if r_mod_d_le_w { 0 } else { 1 };

        let correction: Integer = r_div_d + Integer::from(borrow);
        let enc_correction = ops::encrypt_alice(keys, rng, &correction)?;
        let result = ops::subtract_alice(keys, &enc_quotient, &enc_correction)?;
        Ok(result)
    })();
    session.finish(result)
}

/// Bob's half of outsourced division.
pub fn bob_divide<Ch: Channel>(
    session: &mut BobSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("outsourced_divide", role = "bob").entered();
    let ell = session.config.dgk_params.ell;
    let result = (|| {
        let keys = &session.keys;
        let blinded = session.channel.recv()?.into_big_int()?;
        let d = session.channel.recv()?.into_big_int()?;
        if d.cmp0().is_le() {
            return Err(ComparisonError::PlaintextOutOfRange);
        }

        let sum = ops::decrypt(keys, &blinded)?;
        let quotient: Integer = (&sum / &d).complete();
        let w: Integer = (&sum % &d).complete();

        let enc_quotient = ops::encrypt_bob(keys, rng, &quotient)?;
        session.channel.send(Message::BigInt(enc_quotient))?;

        bob_protocol1_inner(&session.channel, keys, rng, &w, ell)?;
        Ok(())
    })();
    session.finish(result)
}
