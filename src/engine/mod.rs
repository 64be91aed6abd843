//! Task execution.
//!
//! ```text
//! TaskRunner ─ per task ─▶ launch → goto search URL
//!     └─ loop: wait content → dismiss overlays → extract → dedup
//!              → checkpoint → stop? → scroll / next page
//! ```

pub mod dedup;
pub mod pacing;
pub mod runner;
pub mod state;
pub mod waiter;

pub use dedup::DedupIndex;
pub use pacing::{Pacer, ScrollPass};
pub use runner::{RunReport, TaskOutcome, TaskRunner};
pub use state::RunState;
