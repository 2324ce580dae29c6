//! Random passwords and keys for the Syndesis installation.
//!
//! Secrets are generated once per installation and then persisted in the `syndesis-global-config` secret, so the
//! source only needs a uniform alphabet, not a cryptographically hardened stream.
use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use rand::{Rng, SeedableRng, distr::Alphanumeric, rngs::StdRng};

/// Produces random strings over `[a-zA-Z0-9]`
///
/// Construct one per process and share it by reference; draws from several threads are serialized internally.
#[derive(Debug)]
pub struct SecretGenerator {
    rng: Mutex<StdRng>,
}

impl SecretGenerator {
    /// A generator seeded from the current wall clock time
    pub fn from_time_seed() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, seed_from_elapsed);
        Self::with_seed(seed)
    }

    /// A generator with a fixed seed, producing the same sequence on every run
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Returns a string of exactly `length` alphanumeric characters
    pub fn generate(&self, length: usize) -> String {
        // A panic while holding the lock cannot leave the RNG in an invalid state
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (&mut *rng)
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }
}

/// Nanoseconds since the epoch, saturating once they no longer fit
fn seed_from_elapsed(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}
