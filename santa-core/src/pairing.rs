use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{Pairing, ParticipantName};

/// Upper bound on shuffles tried before giving up. A random permutation is a
/// derangement with probability close to 1/e, so this is never reached in practice.
pub const MAX_PAIRING_ATTEMPTS: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("Could not generate pairs after {attempts} attempts. Try again.")]
    GenerationFailed { attempts: usize },
}

/// Draws a random derangement of `names`.
///
/// Pair `i` is always `(names[i], shuffled[i])`. Each attempt is an independent
/// Fisher-Yates shuffle of the full list; the first one without a fixed point wins.
/// Names are expected to be unique, which the roster parser guarantees.
pub fn generate_pairing<R: Rng + ?Sized>(
    names: &[ParticipantName],
    rng: &mut R,
) -> Result<Vec<Pairing>, PairingError> {
    for _ in 0..MAX_PAIRING_ATTEMPTS {
        let mut receivers = names.to_vec();
        receivers.shuffle(rng);

        let has_fixed_point = names.iter().zip(&receivers).any(|(g, r)| g == r);
        if !has_fixed_point {
            return Ok(names
                .iter()
                .zip(receivers)
                .map(|(from, to)| Pairing {
                    from: from.clone(),
                    to,
                })
                .collect());
        }
    }

    Err(PairingError::GenerationFailed {
        attempts: MAX_PAIRING_ATTEMPTS,
    })
}

pub fn generate_pairing_seeded(
    names: &[ParticipantName],
    seed: u64,
) -> Result<Vec<Pairing>, PairingError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_pairing(names, &mut rng)
}

pub fn generate_pairing_random(names: &[ParticipantName]) -> Result<Vec<Pairing>, PairingError> {
    let mut rng = ChaCha8Rng::from_entropy();
    generate_pairing(names, &mut rng)
}
