use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::error::{SampleError, SampleResult};

/// Pick up to `k` distinct candidates, weighted, with a generator seeded from
/// `seed`. Returns fewer than `k` items when the pool runs out.
pub fn sample_without_replacement<T>(
    candidates: Vec<(T, f64)>,
    k: usize,
    seed: u64,
) -> SampleResult<Vec<T>> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    sample_with_rng(candidates, k, &mut rng)
}

/// Same draw procedure as [`sample_without_replacement`] over any generator.
pub fn sample_with_rng<T, R>(
    candidates: Vec<(T, f64)>,
    k: usize,
    rng: &mut R,
) -> SampleResult<Vec<T>>
where
    R: RngCore + ?Sized,
{
    validate(&candidates)?;

    let mut pool = candidates;
    let take = k.min(pool.len());
    let mut chosen = Vec::with_capacity(take);

    for _ in 0..take {
        let total: f64 = pool.iter().map(|(_, w)| *w).sum();
        let draw = unit_draw(rng) * total;
        let index = pick_index(&pool, draw);
        debug!(index, draw, total, remaining = pool.len(), "weighted draw");
        chosen.push(pool.remove(index).0);
    }

    Ok(chosen)
}

/// Uniform value in `[0, 1)` built from the top 53 bits of one `u64`.
pub fn unit_draw<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
    (rng.next_u64() >> 11) as f64 * SCALE
}

fn pick_index<T>(pool: &[(T, f64)], draw: f64) -> usize {
    let mut cumulative = 0.0;
    for (index, (_, weight)) in pool.iter().enumerate() {
        cumulative += weight;
        if cumulative >= draw {
            return index;
        }
    }
    pool.len() - 1
}

fn validate<T>(candidates: &[(T, f64)]) -> SampleResult<()> {
    for (index, (_, weight)) in candidates.iter().enumerate() {
        if !weight.is_finite() || *weight <= 0.0 {
            return Err(SampleError::InvalidWeight {
                index,
                weight: *weight,
            });
        }
    }
    Ok(())
}
