// selene_core/src/error.rs

//! Error types for configuration validation and the filter cycle.

use thiserror::Error;

/// Rejected configuration, reported before any filter is built from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("sample period must be a finite, positive number of seconds, got {0}")]
    InvalidSamplePeriod(f64),

    #[error("{name} must be a finite, non-negative standard deviation, got {value}")]
    InvalidNoiseSigma { name: &'static str, value: f64 },

    #[error("wheel radius must be a finite, positive length in meters, got {0}")]
    InvalidWheelRadius(f64),

    #[error("wheel-to-imu offsets must be finite and not both zero, got ({lx}, {ly})")]
    DegenerateGeometry { lx: f64, ly: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFiniteInitialPose { name: &'static str, value: f64 },
}

/// Failure raised by a predict/update cycle.
///
/// These are structural, not transient: the caller should withhold the
/// cycle's estimate rather than retry the call.
#[derive(Error, Debug)]
pub enum FilterError {
    /// An update was requested with no predict since the last update or
    /// reseed, which would fold the measurement into a stale belief.
    #[error("update called without a paired predict in this cycle")]
    UpdateWithoutPredict,

    /// The innovation covariance could not be inverted. The belief is left
    /// untouched.
    #[error("innovation covariance is singular")]
    SingularInnovationCovariance,

    /// The updated covariance carries a negative variance on its diagonal.
    /// The belief has already been overwritten and should not be trusted.
    #[error("covariance lost positive semi-definiteness")]
    NonPositiveDefiniteCovariance,
}
