// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Random traversal of a generating sequence.
//!
//! Each traversal owns a ChaCha20 generator. [`RandomTraversal::jump`] moves
//! it to the next stream so that successive dimensions of a random CBC search
//! draw independent but reproducible samples.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::Result;
use crate::genseq::GenSeq;

#[derive(Debug, Clone)]
pub struct RandomTraversal {
    rng: ChaCha20Rng,
    stream: u64,
}

impl RandomTraversal {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            stream: 0,
        }
    }

    /// Uniform index in `[0, size)`. `size` must be positive.
    pub fn next_index(&mut self, size: usize) -> usize {
        self.rng.gen_range(0..size)
    }

    /// Uniform element of `seq`, or `None` when it is empty.
    pub fn sample<S: GenSeq + ?Sized>(&mut self, seq: &S) -> Result<Option<u64>> {
        if seq.size() == 0 {
            return Ok(None);
        }
        let i = self.next_index(seq.size());
        seq.element(i).map(Some)
    }

    /// `values` in a uniformly random order, each exactly once.
    pub fn shuffled(&mut self, values: &[u64]) -> Vec<u64> {
        let mut out = values.to_vec();
        out.shuffle(&mut self.rng);
        out
    }

    /// Switches to the next independent stream.
    pub fn jump(&mut self) {
        self.stream += 1;
        self.rng.set_stream(self.stream);
        self.rng.set_word_pos(0);
    }

    pub fn stream(&self) -> u64 {
        self.stream
    }
}
