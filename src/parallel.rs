//! Fork-join reduction of sums over an index range.
//!
//! The range `[0, n)` is split into [ReducerConfig::n_threads] contiguous chunks. Each worker
//! accumulates the terms of its own chunk into private storage, and the partial results
//! are added in the order of the chunks, independent of the order in which the workers
//! finish. For ball-valued sums, the result overlaps the sequential sum but
//! is not necessarily identical to it.
//!
//! ```
//! use ballistica::domains::ball::{Ball, RealBallField};
//! use ballistica::parallel::{parallel_sum, ReducerConfig};
//!
//! let field = RealBallField::new(64);
//! let config = ReducerConfig::new(3);
//! let s = parallel_sum(&field, 100, |k| Ball::from(k as i64), &config);
//! assert_eq!(s, Ball::from(4950));
//! ```

use std::ops::Range;

use rayon::{prelude::*, ThreadPool};
use smallvec::SmallVec;
use tracing::{debug, instrument};

use crate::domains::{vector::vec_add_assign, Ring};

/// Settings for parallel reductions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReducerConfig {
    /// The number of worker threads, which is also the number of chunks.
    pub n_threads: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self { n_threads: 1 }
    }
}

impl ReducerConfig {
    pub fn new(n_threads: usize) -> ReducerConfig {
        if n_threads == 0 {
            panic!("The number of threads must be positive");
        }
        ReducerConfig { n_threads }
    }

    /// Create a thread pool with exactly [ReducerConfig::n_threads] workers.
    fn build_pool(&self) -> ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_threads)
            .build()
            .unwrap_or_else(|e| panic!("Could not create a thread pool: {}", e))
    }
}

/// Split `[0, n)` into `t` contiguous chunks, where chunk `i` is `[i*n/t, (i+1)*n/t)`.
/// If `t > n`, some chunks are empty.
pub fn partition(n: usize, t: usize) -> SmallVec<[Range<usize>; 8]> {
    if t == 0 {
        panic!("Cannot partition into zero chunks");
    }

    let bound = |i: usize| (i as u128 * n as u128 / t as u128) as usize;
    (0..t).map(|i| bound(i)..bound(i + 1)).collect()
}

/// Apply `f` to every chunk of `[0, n)`, in parallel. The results are ordered by chunk.
#[instrument(level = "debug", skip_all, fields(n = n, n_threads = config.n_threads))]
pub fn map_chunks<T: Send>(
    n: usize,
    f: impl Fn(Range<usize>) -> T + Sync,
    config: &ReducerConfig,
) -> Vec<T> {
    let chunks = partition(n, config.n_threads);

    if config.n_threads == 1 {
        return chunks.into_iter().map(f).collect();
    }

    debug!("Reducing {} terms in {} chunks", n, chunks.len());
    let pool = config.build_pool();
    pool.install(|| chunks.as_slice().par_iter().map(|r| f(r.clone())).collect())
}

/// Compute `sum_{k < n} term(k)` in parallel.
pub fn parallel_sum<R: Ring + Sync>(
    ring: &R,
    n: usize,
    term: impl Fn(usize) -> R::Element + Sync,
    config: &ReducerConfig,
) -> R::Element
where
    R::Element: Send,
{
    let partials = map_chunks(
        n,
        |range| {
            let mut acc = ring.zero();
            for k in range {
                ring.add_assign(&mut acc, &term(k));
            }
            acc
        },
        config,
    );

    let mut sum = ring.zero();
    for p in &partials {
        ring.add_assign(&mut sum, p);
    }
    sum
}

/// Compute a sum of vectors of length `len` over `[0, n)` in parallel. The callback
/// `add_term(k, acc)` must add the contribution of term `k` to the accumulator `acc`.
pub fn parallel_sum_series<R: Ring + Sync>(
    ring: &R,
    n: usize,
    len: usize,
    add_term: impl Fn(usize, &mut [R::Element]) + Sync,
    config: &ReducerConfig,
) -> Vec<R::Element>
where
    R::Element: Send,
{
    let partials = map_chunks(
        n,
        |range| {
            let mut acc = vec![ring.zero(); len];
            for k in range {
                add_term(k, &mut acc);
            }
            acc
        },
        config,
    );

    let mut sum = vec![ring.zero(); len];
    for p in &partials {
        vec_add_assign(ring, &mut sum, p);
    }
    sum
}
