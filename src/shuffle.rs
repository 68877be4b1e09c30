// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

/// A random permutation of the input.
pub fn shuffle<T>(mut items: Vec<T>) -> Vec<T> {
    let mut rng = rng();
    items.shuffle(&mut rng);
    items
}

/// As [shuffle], from a slice.
pub fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle(items.to_vec())
}

/// A random permutation of `0..len`.
pub fn shuffled_indices(len: usize) -> Vec<usize> {
    shuffle((0..len).collect())
}

/// A uniformly random index below `len`, or None when `len` is zero.
pub fn pick_index(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let mut rng = rng();
    Some(rng.random_range(0..len))
}

/// A uniformly random number in `[0, 1)`.
pub fn roll() -> f64 {
    let mut rng = rng();
    rng.random_range(0.0..1.0)
}

/// `count` distinct values sampled uniformly from `candidates`,
/// returned in ascending order. Capped at the candidate count.
pub fn sample_sorted(candidates: &[usize], count: usize) -> Vec<usize> {
    let mut pool = candidates.to_vec();
    let mut rng = rng();
    pool.shuffle(&mut rng);
    pool.truncate(count.min(candidates.len()));
    pool.sort_unstable();
    pool
}
