//! Bounded fan-out/fan-in scheduling.
//!
//! ```text
//! Vec<T: WorkUnit>
//!   ↓ dispatch (input order)
//! work queue → N workers → process()
//!   ↓
//! completion queue → finalize() → Vec<T> (completion order)
//! ```

mod scheduler;
pub mod traits;

pub use scheduler::run_bounded;
pub use traits::WorkUnit;
