pub mod cards;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod goal_rate;
pub mod history;
pub mod penalties;
pub mod persist;
pub mod playback;
pub mod poisson;
pub mod ratings;
pub mod rng;
pub mod state;
pub mod synth;

pub use config::{EngineVariant, MatchConfig};
pub use engine::{EngineOptions, MatchResult, simulate_match, simulate_quick};
pub use error::{EngineError, ValidationError};
pub use goal_rate::expected_goal_rate;
pub use poisson::sample_goal_count;
pub use rng::{RandomSource, RngSource, ScriptedSource};
