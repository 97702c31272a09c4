//! Record identifier generation.

use crate::RecordId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::{Builder, Uuid};

/// Source of fresh record identifiers (v4 UUIDs).
///
/// `Seeded` draws the random bytes from a ChaCha8 stream so that a run with a
/// fixed seed produces the same identifiers every time.
#[derive(Debug, Clone)]
pub enum IdGenerator {
    Random,
    Seeded(Box<ChaCha8Rng>),
}

impl IdGenerator {
    pub fn random() -> Self {
        IdGenerator::Random
    }

    pub fn seeded(seed: u64) -> Self {
        IdGenerator::Seeded(Box::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    /// Random when `seed` is `None`, seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::random, Self::seeded)
    }

    pub fn next_id(&mut self) -> RecordId {
        let uuid = match self {
            IdGenerator::Random => Uuid::new_v4(),
            IdGenerator::Seeded(rng) => {
                let bytes: [u8; 16] = rng.gen();
                Builder::from_random_bytes(bytes).into_uuid()
            }
        };
        RecordId(uuid.to_string())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}
