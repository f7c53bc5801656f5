//! Swarm Engine
//!
//! Cat Swarm Optimization over a box-bounded, optionally constrained search
//! space. Each cat is either *seeking* (local resampling with roulette
//! selection) or *tracing* (pulled from its personal best toward the global
//! best). The caller drives the swarm one cat at a time through
//! [`CatSwarm::step`] and [`CatSwarm::evaluate`], and polls
//! [`CatSwarm::complete`] between cycles.

pub mod best;
pub mod boundary;
pub mod engine;
#[cfg(feature = "python")]
pub mod py_api;
pub mod seeking_mode;
pub mod snapshot;
pub mod state;
pub mod tracing_mode;


pub use best::{l2_norm, BestUpdate, ConvergenceCriteria, SENTINEL};
pub use boundary::BoundaryAction;
pub use engine::{CatSwarm, EvalOutcome, StepOutcome};
pub use snapshot::SwarmSnapshot;
pub use state::{CatMode, Phase, SwarmState};
