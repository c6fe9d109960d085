//! Per-call execution context: parallelism, cancellation, encoder knobs.
//!
//! Everything here used to be ambient process state in older texture
//! tools; carrying it as a value makes cancellation and thread
//! configuration testable per call instead of leaking across unrelated
//! operations.

use rayon::ThreadPool;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::codec::EncodeParams;

/// Degree of parallelism for load/save.
///
/// Explicit, never inferred: DDS mip pyramids are often small enough
/// that thread-pool overhead dominates, so sequential is a first-class
/// choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Run every unit on the calling thread.
    Disabled,
    /// Run units on a dedicated pool of this many threads.
    Threads(usize),
}

/// Execution context passed into every load/save call.
pub struct ExecContext {
    parallelism: Parallelism,
    cancel: CancellationToken,
    alpha_threshold: u8,
    pool: Option<ThreadPool>,
}

impl ExecContext {
    /// Sequential context with default encoder settings.
    pub fn new() -> Self {
        Self::with_parallelism(Parallelism::Disabled)
    }

    /// Context with the given parallelism setting.
    pub fn with_parallelism(parallelism: Parallelism) -> Self {
        let pool = match parallelism {
            Parallelism::Disabled => None,
            Parallelism::Threads(n) => {
                match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                    Ok(pool) => Some(pool),
                    Err(e) => {
                        warn!(threads = n, error = %e, "Thread pool build failed, falling back to sequential");
                        None
                    }
                }
            }
        };
        Self {
            parallelism,
            cancel: CancellationToken::new(),
            alpha_threshold: EncodeParams::default().alpha_threshold,
            pool,
        }
    }

    /// Override the DXT1 alpha-transparency threshold.
    pub fn with_alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Request cooperative cancellation of any operation using this
    /// context. Workers observe the signal at unit boundaries.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The underlying token, for callers wiring cancellation into their
    /// own task trees.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    pub(crate) fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub(crate) fn encode_params(&self) -> EncodeParams {
        EncodeParams {
            alpha_threshold: self.alpha_threshold,
        }
    }

    /// Run `f` inside the context's pool (if any) so rayon iterators
    /// inside it use the configured thread count.
    pub(crate) fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new()
    }
}
