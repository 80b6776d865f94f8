use crate::transport::TransportError;

/// Error taxonomy for the two-party comparison and arithmetic suite. Every
/// sub-protocol failure is one of these kinds; none are silently swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    /// Out-of-spec modulus, non-prime where prime required, order mismatch.
    #[error("key parameters are invalid")]
    KeyParamInvalid,

    /// `m` outside `[0,u)` for DGK or `[0,n)` for Paillier.
    #[error("plaintext out of range")]
    PlaintextOutOfRange,

    /// Not in group, wrong bit length, or a decryption lookup miss.
    #[error("ciphertext malformed")]
    CiphertextMalformed,

    /// Mode/variant mismatch between peers, or wrong message/array count.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(&'static str),

    /// The peer closed the channel mid sub-protocol. Poisons the session.
    #[error("transport closed")]
    TransportClosed,

    /// E.g. the legacy-Alice class combined with `dgk_mode = true` for
    /// sorting: a permanently unsupported combination, not a placeholder.
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(&'static str),

    /// Should-never-happen; aborts the session.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),

    /// A primitive cryptographic operation (DGK, Paillier) failed.
    #[error("underlying cryptographic operation failed")]
    Crypto(#[from] CryptoError),
}

/// Wraps the scheme-local `Error` types so they convert into
/// [`ComparisonError::Crypto`] via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error(transparent)]
    Dgk(#[from] crate::dgk::Error),
    #[error(transparent)]
    Paillier(#[from] crate::paillier::Error),
}

impl From<crate::dgk::Error> for ComparisonError {
    fn from(err: crate::dgk::Error) -> Self {
        ComparisonError::Crypto(CryptoError::Dgk(err))
    }
}

impl From<crate::paillier::Error> for ComparisonError {
    fn from(err: crate::paillier::Error) -> Self {
        ComparisonError::Crypto(CryptoError::Paillier(err))
    }
}

impl From<TransportError> for ComparisonError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => ComparisonError::TransportClosed,
            TransportError::UnexpectedMessage => {
                ComparisonError::ProtocolMismatch("unexpected message shape")
            }
        }
    }
}

impl ComparisonError {
    /// A transport error is the only kind that poisons the session; every
    /// other kind leaves the session usable for the next sub-protocol.
    pub fn poisons_session(&self) -> bool {
        matches!(self, ComparisonError::TransportClosed)
    }
}
