//! Deterministic weighted sampling without replacement.
//!
//! The draw procedure is fixed so that a `(candidates, k, seed)` triple
//! always yields the same picks:
//!
//! 1. The generator is `ChaCha20Rng::seed_from_u64(seed)`.
//! 2. One draw takes `next_u64() >> 11`, scales it by `2^-53` into `[0, 1)`
//!    and multiplies by the total weight still in the pool (summed left to
//!    right).
//! 3. The pool is walked left to right accumulating weight; the first
//!    candidate whose cumulative weight reaches the draw is taken out of the
//!    pool. If rounding leaves the walk short, the last candidate is taken.
//! 4. Repeat until `k` picks are made or the pool is empty.

pub mod error;
pub mod sampler;

pub use error::{SampleError, SampleResult};
pub use sampler::{sample_with_rng, sample_without_replacement, unit_draw};
