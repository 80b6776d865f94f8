//! Private equality on plaintexts each party already holds, and encrypted
//! equality on ciphertexts Alice already holds.

use rand_core::{CryptoRng, RngCore};
use rug::Integer;
use tracing::debug_span;

use crate::comparison::{
    alice_protocol2, bob_protocol2, ops, AliceKeys, AliceSession, BobSession, ComparisonError,
};
use crate::transport::{Channel, Message};

/// `[m_A == m_B]`: Alice holds `m_A`, Bob holds `m_B`; each encrypts and
/// trades ciphertexts, then two Protocol 2 calls (`a ≥ b`, `b ≥ a`) are
/// ANDed. Bob learns nothing of `m_A`.
pub fn alice_private_equals<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    m_a: &Integer,
) -> Result<bool, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("private_equals", role = "alice").entered();
    let result = (|| {
        let enc_a = ops::encrypt_alice(session.keys(), rng, m_a)?;
        session.channel().send(Message::BigInt(enc_a.clone()))?;
        let enc_b = session.channel().recv()?.into_big_int()?;

        let a_ge_b = alice_protocol2(session, rng, &enc_a, &enc_b)?;
        let b_ge_a = alice_protocol2(session, rng, &enc_b, &enc_a)?;
        Ok(a_ge_b && b_ge_a)
    })();
    session.finish(result)
}

/// Bob's half of private equality.
pub fn bob_private_equals<Ch: Channel>(
    session: &mut BobSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    m_b: &Integer,
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("private_equals", role = "bob").entered();
    let result = (|| {
        let _enc_a = session.channel().recv()?.into_big_int()?;
        let enc_b = ops::encrypt_bob(session.keys(), rng, m_b)?;
        session.channel().send(Message::BigInt(enc_b))?;

        bob_protocol2(session, rng)?;
        bob_protocol2(session, rng)?;
        Ok(())
    })();
    session.finish(result)
}

/// `[a == b]` on ciphertexts Alice already holds: blind `Enc(a-b)` by a
/// uniform nonzero scalar and let Bob decide `result == 0`.
pub fn alice_encrypted_equals<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    enc_a: &Integer,
    enc_b: &Integer,
) -> Result<bool, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("encrypted_equals", role = "alice").entered();
    let result = (|| {
        let diff = ops::subtract_alice(session.keys(), enc_a, enc_b)?;
        let r = sample_nonzero_scalar(session.keys(), rng);
        let blinded = ops::scalar_multiply_alice(session.keys(), &r, &diff)?;
        session.channel().send(Message::BigInt(blinded))?;
        let equal = session.channel().recv()?.into_bool()?;
        Ok(equal)
    })();
    session.finish(result)
}

/// Bob's half of encrypted equality.
pub fn bob_encrypted_equals<Ch: Channel>(
    session: &mut BobSession<Ch>,
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("encrypted_equals", role = "bob").entered();
    let result = (|| {
        let blinded = session.channel().recv()?.into_big_int()?;
        let plain = ops::decrypt(session.keys(), &blinded)?;
        session.channel().send(Message::Bool(plain == 0))?;
        Ok(())
    })();
    session.finish(result)
}

/// Samples `r` uniformly from `[1,u)` for DGK or `Z_n*` for Paillier, per
/// the resolved bias concern around `r = 0` in the blinded zero-test.
fn sample_nonzero_scalar(keys: &AliceKeys, rng: &mut (impl RngCore + CryptoRng)) -> Integer {
    match keys {
        AliceKeys::Dgk(ek) => {
            let u = ek.u().clone();
            loop {
                let r = crate::ntl::random_bits(rng, u.significant_bits()) % &u;
                if r != 0 {
                    return r;
                }
            }
        }
        AliceKeys::Paillier(ek) => crate::ntl::random_coprime(rng, ek.n()),
    }
}
