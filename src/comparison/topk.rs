//! Top-K selection over an array of ciphertexts: iteratively picks the next
//! minimum (or maximum) by a tournament of pairwise Protocol 2 calls,
//! removing the selected index from the candidate set each round.

use rand_core::{CryptoRng, RngCore};
use rug::Integer;
use tracing::debug_span;

use crate::comparison::{alice_protocol2, bob_protocol2, AliceSession, BobSession, ComparisonError, Mode};
use crate::transport::Channel;

/// Alice's half of Top-K. `ascending = true` returns the `k` smallest
/// ciphertexts in ascending plaintext order; `false` returns the `k`
/// largest in descending order. `legacy` selects the older Alice driver
/// class — combined with DGK mode this is permanently unsupported, mirroring
/// the one combination the reference sorting routine never supported.
pub fn alice_top_k<Ch: Channel>(
    session: &mut AliceSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    values: &[Integer],
    k: usize,
    ascending: bool,
    legacy: bool,
) -> Result<Vec<Integer>, ComparisonError> {
    session.begin()?;
    let _span = debug_span!("top_k", role = "alice", k, ascending).entered();
    let result = (|| {
        if legacy && session.config().mode == Mode::Dgk {
            return Err(ComparisonError::UnsupportedCombination(
                "legacy Alice driver with DGK-mode sorting",
            ));
        }
        if k == 0 || k > values.len() {
            return Err(ComparisonError::PlaintextOutOfRange);
        }

        let mut remaining = values.to_vec();
        let mut output = Vec::with_capacity(k);
        for _ in 0..k {
            let mut best = 0usize;
            for i in 1..remaining.len() {
                // `ge` is `[remaining[best] >= remaining[i]]` under
                // ORIGINAL/VEUGEN, `[remaining[best] > remaining[i]]` under
                // JOYE; either way it tells us whether `i` should replace
                // the current pick for the requested direction.
                let ge = alice_protocol2(session, rng, &remaining[best], &remaining[i])?;
                let replace = if ascending { ge } else { !ge };
                if replace {
                    best = i;
                }
            }
            output.push(remaining.remove(best));
        }
        Ok(output)
    })();
    session.finish(result)
}

/// Bob's half of Top-K: `n` is the (public) candidate-array length, `k` the
/// (public) selection count, matched against Alice's tournament shape.
pub fn bob_top_k<Ch: Channel>(
    session: &mut BobSession<Ch>,
    rng: &mut (impl RngCore + CryptoRng),
    n: usize,
    k: usize,
    legacy: bool,
) -> Result<(), ComparisonError> {
    session.begin()?;
    let _span = debug_span!("top_k", role = "bob", n, k).entered();
    let result = (|| {
        if legacy && session.config().mode == Mode::Dgk {
            return Err(ComparisonError::UnsupportedCombination(
                "legacy Alice driver with DGK-mode sorting",
            ));
        }
        if k == 0 || k > n {
            return Err(ComparisonError::PlaintextOutOfRange);
        }

        let mut remaining = n;
        for _ in 0..k {
            for _ in 1..remaining {
                bob_protocol2(session, rng)?;
            }
            remaining -= 1;
        }
        Ok(())
    })();
    session.finish(result)
}
