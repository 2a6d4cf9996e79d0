//! Scout Core - FRC Destination: Deep Space scouting prediction library.
//!
//! Aggregates raw match observations into per-team statistical reports and
//! combines three reports into alliance-level score and ranking point
//! predictions, with Monte Carlo uncertainty estimates.

pub mod alliance;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod observation;
pub mod stats;
pub mod team;
pub mod text;

pub use alliance::AllianceReport;
pub use error::ScoutError;
pub use metrics::{prefixed_metrics, MetricFn, AUTO_METRICS, METRIC_GROUPS, OVERALL_METRICS, TELE_METRICS};
pub use observation::{GamePiece, Observation, PostMatch, PreMatch, Sandstorm, TeleOp};
pub use team::TeamReport;
