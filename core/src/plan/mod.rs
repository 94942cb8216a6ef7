//! Task plan model.
//!
//! A plan is a series of steps run strictly in order, each either a single
//! shell command or a group of commands run in parallel, followed by an
//! optional top-level parallel group. Metadata (working directory and output
//! redirection) is inherited from the top-level `meta` block while decoding,
//! so the tree is fully resolved before anything runs.

pub mod decode;
mod load;
mod types;

pub use decode::{decode_plan, decode_str};
pub use load::{load_plan, DEFAULT_PLAN_FILE};
pub use types::{Command, Meta, Plan, SeriesItem};
