//! Deterministic random streams for the simulated stages.
//!
//! Every (app, stage) pair draws from its own [`StdRng`], derived from the
//! run seed, so results do not depend on the order in which apps are
//! assessed or on whether they run concurrently.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pipeline stage that owns a random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect,
    Detect,
    Bypass,
}

impl Stage {
    fn salt(&self) -> u64 {
        match self {
            Stage::Collect => 0x636f_6c6c_6563_7400,
            Stage::Detect => 0x6465_7465_6374_0000,
            Stage::Bypass => 0x6279_7061_7373_0000,
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Returns the random stream for `package` at `stage` under `seed`.
pub fn stream(seed: u64, package: &str, stage: Stage) -> StdRng {
    StdRng::seed_from_u64(seed ^ fnv1a(package.as_bytes()) ^ stage.salt())
}

/// Draws a fresh run seed when none was configured.
pub fn random_seed() -> u64 {
    rand::thread_rng().gen()
}
