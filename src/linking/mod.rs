//! The linking engine.
//!
//! [`planner::collect`] walks one package and returns the
//! [`LinkCandidate`]s to create; [`executor::create`] links them and sorts
//! each into a [`LinkOutcome`] bucket of the returned [`RunResult`].
pub mod executor;
pub mod filter;
pub mod outcome;
pub mod planner;
pub mod tags;

pub use outcome::{LinkCandidate, LinkOutcome, RunResult};
