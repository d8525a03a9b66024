// selene_core/src/prelude.rs

// --- Configuration and Errors ---
pub use crate::config::TrackerConfig;
pub use crate::error::{ConfigError, FilterError};

// --- Estimation (The main contracts of the library) ---
pub use crate::estimation::filters::linear::LinearKalmanFilter;
pub use crate::estimation::tracker::{PoseEstimate, PoseTracker};

// --- Core Type Aliases ---
pub use crate::types::{Covariance, MeasurementVector, StateVector};

// --- Utilities ---
pub use crate::utils::wrap_to_two_pi;
