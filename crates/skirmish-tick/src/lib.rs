//! Single-authority scheduling for Skirmish.
//!
//! All match state is mutated by exactly one task. This crate gives that
//! task its two timing primitives:
//!
//! - [`TickScheduler`]: a fixed-rate clock (20 Hz by default) with
//!   overrun detection, pause/resume and budget metrics.
//! - [`DeferredTasks`]: explicit task objects due N ticks from now, owned
//!   by a key (a match id) so all of an owner's pending work can be
//!   cancelled at once on teardown.
//!
//! # Integration
//!
//! Both sit inside the authority's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* apply command */ }
//!         _ = clock.wait_for_tick() => {
//!             for due in tasks.advance() { /* run due work */ }
//!             clock.record_tick_end();
//!         }
//!     }
//! }
//! ```

mod deferred;
mod scheduler;

pub use deferred::{DeferredTasks, DueTask, TaskId};
pub use scheduler::{TickConfig, TickInfo, TickMetrics, TickPolicy, TickScheduler};
