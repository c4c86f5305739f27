//! Timing and progression engine
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Time only arrives as timestamps passed in by the driver
//! - Audio only leaves through an injected `AudioSink`
//! - Derived values (interval, window) are recomputed on every read

pub mod autoplay;
pub mod clock;
pub mod game;
pub mod scheduler;
pub mod state;
pub mod tap;
pub mod tick;

pub use autoplay::{AutoPlayer, SimulationReport, simulate};
pub use clock::BeatClock;
pub use game::{Engine, EngineSnapshot, TapOutcome};
pub use scheduler::{BeatScheduler, BeatTick};
pub use state::{GamePhase, ProgressionState, TapResult};
pub use tap::{Judgment, Verdict, judge};
pub use tick::{FrameInput, FrameReport};
