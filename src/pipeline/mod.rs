//! Load/save orchestration.
//!
//! The orchestrator ties the header model, format registry, mip
//! arithmetic and codecs together as a parallel-for over independent
//! work units: one compressed block (block formats) or one whole mip
//! (uncompressed formats). Units share nothing but disjoint slices of a
//! pre-sized buffer, so no locking is involved; cancellation is a
//! cooperative token polled at unit boundaries.

mod context;
mod load;
mod save;

pub use context::{ExecContext, Parallelism};
pub use load::{load, load_any};
pub use save::{save, AlphaPolicy, MipPolicy};
