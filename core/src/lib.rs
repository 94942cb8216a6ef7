//! Declarative shell task plans: series of steps, bounded-parallel groups and
//! inheritable execution metadata.

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod plan;
pub mod runner;
