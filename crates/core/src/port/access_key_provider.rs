// Access Key Provider Port

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of consumer access keys.
///
/// Keys are opaque decimal strings. No implementation promises uniqueness:
/// two consumers may receive the same key.
pub trait AccessKeyProvider: Send + Sync {
    fn generate_key(&self) -> String;
}

/// Process-wide PRNG, seeded once from OS entropy. Not cryptographic.
pub struct RandomAccessKeyProvider {
    rng: Mutex<StdRng>,
}

impl RandomAccessKeyProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fixed seed, reproducible key sequence
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomAccessKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessKeyProvider for RandomAccessKeyProvider {
    fn generate_key(&self) -> String {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let key: u64 = rng.gen_range(0..=i64::MAX as u64);
        key.to_string()
    }
}
