// selene_core/src/config.rs

use serde::Deserialize;

use crate::error::ConfigError;

/// # TrackerConfig
/// Every tunable the pose tracker fixes at initialization: the control tick
/// period, the starting pose, the drive geometry, and the noise standard
/// deviations that become the diagonal process and measurement covariances.
///
/// All fields default to the stock mecanum platform values, so a TOML file
/// only needs to name the fields it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
#[serde(default)]
pub struct TrackerConfig {
    /// Control tick period in seconds.
    pub sample_period: f64,

    /// Initial x position in meters.
    pub initial_x: f64,
    /// Initial y position in meters.
    pub initial_y: f64,
    /// Initial heading in radians, clockwise positive.
    pub initial_heading: f64,

    /// Lateral offset from the wheel axle to the inertial unit along x, meters.
    pub offset_x: f64,
    /// Lateral offset from the wheel axle to the inertial unit along y, meters.
    pub offset_y: f64,
    /// Drive wheel radius in meters.
    pub wheel_radius: f64,

    /// Process noise standard deviation for each position component, meters.
    pub sigma_position: f64,
    /// Process noise standard deviation for each velocity component, m/s.
    pub sigma_velocity: f64,
    /// Process noise standard deviation for the angular rate, rad/s.
    pub sigma_angular_rate: f64,
    /// Process noise standard deviation for the heading, radians.
    pub sigma_heading: f64,

    /// Encoder angular-rate noise standard deviation at the wheel, rad/s.
    pub sigma_encoder_rate: f64,
    /// Inertial heading noise standard deviation, radians.
    pub sigma_imu_heading: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_period: 0.05,
            initial_x: 0.0,
            initial_y: 0.0,
            initial_heading: 0.0,
            offset_x: 0.5,
            offset_y: 0.5,
            wheel_radius: 0.098,
            sigma_position: 0.1,
            sigma_velocity: 0.1,
            sigma_angular_rate: 0.1,
            sigma_heading: 0.1,
            sigma_encoder_rate: 0.001,
            sigma_imu_heading: 0.1,
        }
    }
}

impl TrackerConfig {
    /// Position process variance, sigma squared.
    pub fn var_position(&self) -> f64 {
        self.sigma_position.powi(2)
    }

    /// Velocity process variance, sigma squared.
    pub fn var_velocity(&self) -> f64 {
        self.sigma_velocity.powi(2)
    }

    /// Angular-rate process variance, sigma squared.
    pub fn var_angular_rate(&self) -> f64 {
        self.sigma_angular_rate.powi(2)
    }

    /// Heading process variance, sigma squared.
    pub fn var_heading(&self) -> f64 {
        self.sigma_heading.powi(2)
    }

    /// Inertial heading measurement variance, sigma squared.
    pub fn var_imu_heading(&self) -> f64 {
        self.sigma_imu_heading.powi(2)
    }

    /// Checks the configuration before any filter is built from it.
    ///
    /// The sample period and wheel radius must be finite and positive, every
    /// noise standard deviation finite and non-negative, the wheel-to-imu
    /// offsets finite and not both zero, and the initial pose finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_period.is_finite() || self.sample_period <= 0.0 {
            return Err(ConfigError::InvalidSamplePeriod(self.sample_period));
        }

        for (name, value) in [
            ("sigma_position", self.sigma_position),
            ("sigma_velocity", self.sigma_velocity),
            ("sigma_angular_rate", self.sigma_angular_rate),
            ("sigma_heading", self.sigma_heading),
            ("sigma_encoder_rate", self.sigma_encoder_rate),
            ("sigma_imu_heading", self.sigma_imu_heading),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidNoiseSigma { name, value });
            }
        }

        if !self.wheel_radius.is_finite() || self.wheel_radius <= 0.0 {
            return Err(ConfigError::InvalidWheelRadius(self.wheel_radius));
        }

        // The angular channel of the measurement noise divides by the squared
        // offset norm.
        if !self.offset_x.is_finite()
            || !self.offset_y.is_finite()
            || (self.offset_x == 0.0 && self.offset_y == 0.0)
        {
            return Err(ConfigError::DegenerateGeometry {
                lx: self.offset_x,
                ly: self.offset_y,
            });
        }

        for (name, value) in [
            ("initial_x", self.initial_x),
            ("initial_y", self.initial_y),
            ("initial_heading", self.initial_heading),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteInitialPose { name, value });
            }
        }

        Ok(())
    }
}
