//! The secure two-party comparison and arithmetic engine: DGK "Protocol 1",
//! the Veugen/Joye "Protocol 2" encrypted-comparison reduction, outsourced
//! multiplication/division, Top-K selection, and private/encrypted
//! equality — all layered over the DGK and Paillier primitives and driven
//! over a [`crate::transport::Channel`] by an *Alice* (client) and *Bob*
//! (key holder) role pair.

mod equality;
mod error;
mod outsourced;
mod protocol1;
mod protocol2;
mod topk;

use std::sync::Arc;

use rug::Integer;

use crate::dgk;
use crate::paillier;
use crate::transport::Channel;

pub use error::{ComparisonError, CryptoError};
pub use outsourced::{alice_divide, alice_multiply, bob_divide, bob_multiply};
pub use protocol1::{alice_protocol1, bob_protocol1};
pub use protocol2::{alice_protocol2, bob_protocol2};
pub use equality::{
    alice_encrypted_equals, alice_private_equals, bob_encrypted_equals, bob_private_equals,
};
pub use topk::{alice_top_k, bob_top_k};

/// Which homomorphic scheme backs the ciphertexts flowing through a
/// session's sub-protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Dgk,
    Paillier,
}

/// Which published refinement of the DGK comparison protocol a session
/// speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// DGK'07 paper semantics: Protocol 1/2 compute `x ≤ y`.
    Original,
    /// Adds extra delta-bit blinding to resist a chosen-input attack by
    /// Alice.
    Veugen,
    /// Reorders the scan with opposite polarity; computes `x < y` (or
    /// `x ≤ y` depending on the subvariant selected by `joye_strict`).
    Joye,
}

#[derive(Clone, Copy, Debug)]
pub struct PaillierParams {
    pub key_size: u32,
    pub use_fast_variant: bool,
}

impl Default for PaillierParams {
    fn default() -> Self {
        Self {
            key_size: 1024,
            use_fast_variant: true,
        }
    }
}

/// The engine-wide configuration: which scheme backs ciphertexts, which
/// comparison variant is spoken, and each scheme's key-generation
/// parameters.
#[derive(Clone, Copy, Debug)]
pub struct ProtocolConfig {
    pub mode: Mode,
    pub variant: Variant,
    pub dgk_params: dgk::Params,
    pub paillier_params: PaillierParams,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Dgk,
            variant: Variant::Original,
            dgk_params: dgk::Params::default(),
            paillier_params: PaillierParams::default(),
        }
    }
}

/// The public key(s) Alice holds for the session's active [`Mode`].
#[derive(Clone)]
pub enum AliceKeys {
    Dgk(Arc<dgk::EncryptionKey>),
    Paillier(Arc<paillier::EncryptionKey>),
}

/// The key material Bob holds for the session's active [`Mode`] — the
/// private key, which also carries a copy of the matching public key.
#[derive(Clone)]
pub enum BobKeys {
    Dgk(Arc<dgk::DecryptionKey>),
    Paillier(Arc<paillier::DecryptionKey>),
}

impl AliceKeys {
    fn mode(&self) -> Mode {
        match self {
            AliceKeys::Dgk(_) => Mode::Dgk,
            AliceKeys::Paillier(_) => Mode::Paillier,
        }
    }
}

impl BobKeys {
    fn mode(&self) -> Mode {
        match self {
            BobKeys::Dgk(_) => Mode::Dgk,
            BobKeys::Paillier(_) => Mode::Paillier,
        }
    }
}

/// Per-sub-protocol-call state machine. A session stays `Idle` between
/// calls; each sub-protocol call transitions through `AwaitingResponse` and
/// lands on `Success` or `Error`. Only a transport error poisons the
/// session for subsequent calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
    Success,
    Error,
    Poisoned,
}

/// Alice's (the client's) half of a comparison session: the public key(s),
/// channel, and negotiated mode/variant.
pub struct AliceSession<Ch: Channel> {
    config: ProtocolConfig,
    keys: AliceKeys,
    channel: Ch,
    state: SessionState,
}

/// Bob's (the key holder's) half of a comparison session.
pub struct BobSession<Ch: Channel> {
    config: ProtocolConfig,
    keys: BobKeys,
    channel: Ch,
    state: SessionState,
}

impl<Ch: Channel> AliceSession<Ch> {
    pub fn new(config: ProtocolConfig, keys: AliceKeys, channel: Ch) -> Result<Self, ComparisonError> {
        if keys.mode() != config.mode {
            return Err(ComparisonError::ProtocolMismatch(
                "Alice's key scheme does not match the configured mode",
            ));
        }
        Ok(Self {
            config,
            keys,
            channel,
            state: SessionState::Idle,
        })
    }

    pub fn config(&self) -> ProtocolConfig {
        self.config
    }

    pub fn keys(&self) -> &AliceKeys {
        &self.keys
    }

    pub fn channel(&self) -> &Ch {
        &self.channel
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Opens one state-machine-tracked sub-protocol call: fails fast if the
    /// session was poisoned by a prior transport error, else transitions to
    /// `AwaitingResponse`.
    pub(crate) fn begin(&mut self) -> Result<(), ComparisonError> {
        if self.state == SessionState::Poisoned {
            return Err(ComparisonError::TransportClosed);
        }
        self.state = SessionState::AwaitingResponse;
        Ok(())
    }

    /// Closes a sub-protocol call begun with [`Self::begin`], landing the
    /// state machine on `Success`, `Error`, or `Poisoned`.
    pub(crate) fn finish<T>(&mut self, result: Result<T, ComparisonError>) -> Result<T, ComparisonError> {
        self.state = match &result {
            Ok(_) => SessionState::Success,
            Err(err) if err.poisons_session() => SessionState::Poisoned,
            Err(_) => SessionState::Error,
        };
        result
    }
}

impl<Ch: Channel> BobSession<Ch> {
    pub fn new(config: ProtocolConfig, keys: BobKeys, channel: Ch) -> Result<Self, ComparisonError> {
        if keys.mode() != config.mode {
            return Err(ComparisonError::ProtocolMismatch(
                "Bob's key scheme does not match the configured mode",
            ));
        }
        Ok(Self {
            config,
            keys,
            channel,
            state: SessionState::Idle,
        })
    }

    pub fn config(&self) -> ProtocolConfig {
        self.config
    }

    pub fn keys(&self) -> &BobKeys {
        &self.keys
    }

    pub fn channel(&self) -> &Ch {
        &self.channel
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn begin(&mut self) -> Result<(), ComparisonError> {
        if self.state == SessionState::Poisoned {
            return Err(ComparisonError::TransportClosed);
        }
        self.state = SessionState::AwaitingResponse;
        Ok(())
    }

    pub(crate) fn finish<T>(&mut self, result: Result<T, ComparisonError>) -> Result<T, ComparisonError> {
        self.state = match &result {
            Ok(_) => SessionState::Success,
            Err(err) if err.poisons_session() => SessionState::Poisoned,
            Err(_) => SessionState::Error,
        };
        result
    }
}

/// Scheme-dispatching homomorphic helpers shared by every sub-protocol.
/// Ciphertexts are always `rug::Integer` (both `dgk::Ciphertext` and
/// `paillier::Ciphertext` are aliases of it); only the encrypt/decrypt
/// boundary and plaintext-range checks differ between the two schemes.
pub(crate) mod ops {
    use super::*;

    pub(crate) fn encrypt_alice(
        keys: &AliceKeys,
        rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng),
        m: &Integer,
    ) -> Result<Integer, ComparisonError> {
        match keys {
            AliceKeys::Dgk(ek) => {
                let m = to_dgk_plaintext(m)?;
                Ok(ek.encrypt_with_random(rng, &m)?.0)
            }
            AliceKeys::Paillier(ek) => {
                // The comparison layer speaks of Paillier plaintexts as
                // nonnegative residues in [0, n) (§3's invariant); the
                // encryption key itself encrypts in the signed {-N/2,..,N/2}
                // convention, so translate at this boundary only.
                let signed = paillier::Unsigned::new(ek, m.clone()).to_signed(ek);
                Ok(ek.encrypt_with_random(rng, &signed)?.0)
            }
        }
    }

    pub(crate) fn encrypt_bob(
        keys: &BobKeys,
        rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng),
        m: &Integer,
    ) -> Result<Integer, ComparisonError> {
        match keys {
            BobKeys::Dgk(dk) => {
                let m = to_dgk_plaintext(m)?;
                Ok(dk.encrypt_with_random(rng, &m)?.0)
            }
            BobKeys::Paillier(dk) => {
                let ek = dk.encryption_key();
                let signed = paillier::Unsigned::new(&ek, m.clone()).to_signed(&ek);
                Ok(dk.encrypt_with_random(rng, &signed)?.0)
            }
        }
    }

    pub(crate) fn decrypt(keys: &BobKeys, c: &Integer) -> Result<Integer, ComparisonError> {
        match keys {
            BobKeys::Dgk(dk) => Ok(Integer::from(dk.decrypt(c)?)),
            BobKeys::Paillier(dk) => {
                let signed = dk.decrypt(c)?;
                let ek = dk.encryption_key();
                Ok(paillier::Unsigned::from_signed(&ek, &signed).into_integer())
            }
        }
    }

    pub(crate) fn add_alice(
        keys: &AliceKeys,
        a: &Integer,
        b: &Integer,
    ) -> Result<Integer, ComparisonError> {
        match keys {
            AliceKeys::Dgk(ek) => Ok(ek.add(a, b)?),
            AliceKeys::Paillier(ek) => Ok(ek.oadd(a, b)?),
        }
    }

    pub(crate) fn subtract_alice(
        keys: &AliceKeys,
        a: &Integer,
        b: &Integer,
    ) -> Result<Integer, ComparisonError> {
        match keys {
            AliceKeys::Dgk(ek) => Ok(ek.subtract(a, b)?),
            AliceKeys::Paillier(ek) => Ok(ek.osub(a, b)?),
        }
    }

    pub(crate) fn scalar_multiply_alice(
        keys: &AliceKeys,
        scalar: &Integer,
        c: &Integer,
    ) -> Result<Integer, ComparisonError> {
        match keys {
            AliceKeys::Dgk(ek) => Ok(ek.scalar_multiply(scalar, c)?),
            AliceKeys::Paillier(ek) => Ok(ek.omul(scalar, c)?),
        }
    }

    pub(crate) fn rerandomize_alice(
        keys: &AliceKeys,
        rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng),
        c: &Integer,
    ) -> Result<Integer, ComparisonError> {
        match keys {
            AliceKeys::Dgk(ek) => Ok(ek.rerandomize(rng, c)?),
            AliceKeys::Paillier(ek) => Ok(ek.rerandomize(rng, c)?),
        }
    }

    /// The plaintext modulus of the active scheme: `u` for DGK, `n` for
    /// Paillier.
    pub(crate) fn modulus_alice(keys: &AliceKeys) -> Integer {
        match keys {
            AliceKeys::Dgk(ek) => ek.u().clone(),
            AliceKeys::Paillier(ek) => ek.n().clone(),
        }
    }

    /// The plaintext modulus of the active scheme: `u` for DGK, `n` for
    /// Paillier.
    pub(crate) fn modulus_bob(keys: &BobKeys) -> Integer {
        match keys {
            BobKeys::Dgk(dk) => dk.encryption_key().u().clone(),
            BobKeys::Paillier(dk) => dk.n().clone(),
        }
    }

    fn to_dgk_plaintext(m: &Integer) -> Result<dgk::Plaintext, ComparisonError> {
        m.to_u32().ok_or(ComparisonError::PlaintextOutOfRange)
    }
}
