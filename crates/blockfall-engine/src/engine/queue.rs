use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::PieceKind;

/// Upcoming-piece queue using the 7-bag randomization algorithm.
///
/// A "bag" holding one of each of the 7 piece types is shuffled and drawn
/// from in order; a fresh shuffled bag is appended whenever the queue runs
/// low. Every window of 14 consecutive draws therefore contains each piece
/// type at least once, so no piece can drought indefinitely.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    pending: VecDeque<PieceKind>,
    preview_count: usize,
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the queue's random number generator. Two queues built
/// from the same seed produce the same piece sequence, which enables replays
/// and deterministic tests. Serializes as a 32-character hex string.
#[derive(Debug, Clone, Copy)]
pub struct QueueSeed([u8; 16]);

impl Serialize for QueueSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for QueueSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl From<[u8; 16]> for QueueSeed {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Distribution<QueueSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QueueSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        QueueSeed(seed)
    }
}

impl PieceQueue {
    /// Creates a queue with a random seed.
    ///
    /// `preview_count` is how many upcoming pieces [`Self::upcoming`] always
    /// has available.
    #[must_use]
    pub fn new(preview_count: usize) -> Self {
        Self::with_seed(preview_count, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece
    /// generation.
    #[must_use]
    pub fn with_seed(preview_count: usize, seed: QueueSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let pending = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self {
            rng,
            pending,
            preview_count,
        };
        this.refill();
        this
    }

    /// Appends shuffled bags until the preview stays full after the next
    /// draw.
    fn refill(&mut self) {
        while self.pending.len() <= self.preview_count {
            let mut bag = PieceKind::ALL;
            bag.shuffle(&mut self.rng);
            self.pending.extend(bag);
        }
    }

    /// Draws the next piece from the queue.
    pub fn pop_next(&mut self) -> PieceKind {
        self.refill();
        self.pending
            .pop_front()
            .expect("piece queue refill keeps the queue non-empty")
    }

    /// The upcoming pieces, exactly the configured preview length.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.pending.iter().copied().take(self.preview_count)
    }
}
