// selene_core/src/estimation/tracker.rs

use nalgebra::{DMatrix, DVector, Rotation2, Vector2};

use crate::config::TrackerConfig;
use crate::error::{ConfigError, FilterError};
use crate::estimation::filters::linear::LinearKalmanFilter;
use crate::types::{Covariance, MeasurementVector, StateVector};

// State component order inside the filter.
const PX: usize = 0;
const PY: usize = 1;
const VX: usize = 2;
const VY: usize = 3;
const WZ: usize = 4;
const THETA: usize = 5;

const STATE_DIM: usize = 6;
const MEASUREMENT_DIM: usize = 4;

/// Fused 2D pose estimate for a mecanum ground vehicle.
///
/// The tracker runs a constant-velocity linear Kalman filter over the state
/// [px, py, vx, vy, wz, theta], fed once per control tick with wheel-odometry
/// body velocities plus the odometry angular rate and the inertial heading.
///
/// Heading is left-handed: it increases clockwise. The wheel angular rate and
/// the inertial heading arrive right-handed and are negated on ingestion, so
/// nothing right-handed ever reaches the state or measurement vectors. Body
/// velocities are rotated into the global frame with the heading estimate
/// itself, which linearizes the otherwise nonlinear body-to-global coupling
/// around the current belief.
pub struct PoseTracker {
    filter: LinearKalmanFilter,
    /// Fixed measurement noise (R), derived once from the configuration.
    measurement_noise: Covariance,
    /// Prior variances restored by the known-value overrides.
    var_position: f64,
    var_heading: f64,
    /// Velocity pair most recently rotated into the global frame.
    last_rotated_velocity: Vector2<f64>,
}

impl PoseTracker {
    /// Builds the filter matrices from the configuration and seeds the
    /// belief at the configured pose, at rest, with the process noise as the
    /// initial uncertainty.
    pub fn new(config: &TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let process_noise = Self::process_noise_matrix(config);
        let mut filter = LinearKalmanFilter::new(
            Self::transition_matrix(config.sample_period),
            process_noise.clone(),
            Self::measurement_matrix(),
        );

        let mut state = StateVector::zeros(STATE_DIM);
        state[PX] = config.initial_x;
        state[PY] = config.initial_y;
        state[THETA] = config.initial_heading;
        filter.set_state(state, process_noise);

        log::debug!(
            "pose tracker initialized at ({}, {}), heading {} rad, tick {} s",
            config.initial_x,
            config.initial_y,
            config.initial_heading,
            config.sample_period
        );

        Ok(Self {
            filter,
            measurement_noise: Self::measurement_noise_matrix(config),
            var_position: config.var_position(),
            var_heading: config.var_heading(),
            last_rotated_velocity: Vector2::zeros(),
        })
    }

    /// Runs one predict/update cycle against this tick's sensor readings.
    ///
    /// `vx` and `vy` are body-frame velocities in m/s. `wheel_rate` is the
    /// odometry-derived angular velocity and `imu_heading` the inertial
    /// heading, both right-handed; they are negated here to match the
    /// filter's clockwise-positive convention.
    ///
    /// The cycle is ordered read heading, rotate, predict, update. The
    /// velocity pair is rotated by the negative of the heading estimate as it
    /// stood before the predict step; reordering these stages changes the
    /// numbers measurably.
    pub fn update_measurement(
        &mut self,
        vx: f64,
        vy: f64,
        wheel_rate: f64,
        imu_heading: f64,
    ) -> Result<(), FilterError> {
        // 1. Rotate the body-frame velocity pair into the global frame using
        //    the prior heading estimate.
        let heading = self.filter.state()[THETA];
        let rotated = Rotation2::new(-heading) * Vector2::new(vx, vy);
        self.last_rotated_velocity = rotated;

        // 2. Assemble the measurement, flipping the right-handed angular
        //    inputs into the left-handed convention.
        let z = MeasurementVector::from_row_slice(&[
            rotated.x,
            rotated.y,
            -wheel_rate,
            -imu_heading,
        ]);

        // 3. Advance the model one tick, then fold the measurement in.
        self.filter.predict();
        self.filter.update(&z, &self.measurement_noise)
    }

    /// Estimated x position in meters.
    pub fn x_position(&self) -> f64 {
        self.filter.state()[PX]
    }

    /// Estimated y position in meters.
    pub fn y_position(&self) -> f64 {
        self.filter.state()[PY]
    }

    /// Estimated heading in radians, clockwise positive. Never wrapped; see
    /// `utils::wrap_to_two_pi` for a canonical range.
    pub fn heading(&self) -> f64 {
        self.filter.state()[THETA]
    }

    /// Estimated angular velocity in rad/s, clockwise positive.
    pub fn angular_velocity(&self) -> f64 {
        self.filter.state()[WZ]
    }

    /// Magnitude of the estimated global-frame velocity in m/s.
    pub fn speed(&self) -> f64 {
        let state = self.filter.state();
        state[VX].hypot(state[VY])
    }

    /// The velocity pair most recently rotated into the global frame, exactly
    /// as it was fed to the filter. Diagnostic only.
    pub fn last_rotated_velocity(&self) -> Vector2<f64> {
        self.last_rotated_velocity
    }

    /// All public outputs bundled into one snapshot.
    pub fn estimate(&self) -> PoseEstimate {
        PoseEstimate {
            x: self.x_position(),
            y: self.y_position(),
            heading: self.heading(),
            angular_velocity: self.angular_velocity(),
            speed: self.speed(),
        }
    }

    /// Overrides the x position with an externally known value.
    ///
    /// The belief in that one component is replaced outright, not blended:
    /// its variance is reset to the configured position prior so later cycles
    /// sharpen it again, and every other state component and covariance
    /// entry, off-diagonal correlations included, is left untouched.
    pub fn set_known_x_position(&mut self, x: f64) {
        log::debug!("known x position injected: {}", x);
        self.inject(PX, x, self.var_position);
    }

    /// Overrides the y position with an externally known value.
    pub fn set_known_y_position(&mut self, y: f64) {
        log::debug!("known y position injected: {}", y);
        self.inject(PY, y, self.var_position);
    }

    /// Overrides the heading with an externally known value, taken in the
    /// filter's clockwise-positive convention. The heading variance is reset
    /// to the configured prior.
    pub fn set_known_heading(&mut self, heading: f64) {
        log::debug!("known heading injected: {}", heading);
        self.inject(THETA, heading, self.var_heading);
    }

    fn inject(&mut self, index: usize, value: f64, prior_variance: f64) {
        let mut state = self.filter.state().clone();
        let mut covariance = self.filter.covariance().clone();
        state[index] = value;
        covariance[(index, index)] = prior_variance;
        self.filter.set_state(state, covariance);
    }

    /// Constant-velocity transition over one tick: position integrates
    /// velocity, heading integrates angular rate, everything else carries
    /// over unchanged.
    fn transition_matrix(period: f64) -> DMatrix<f64> {
        let mut a = DMatrix::identity(STATE_DIM, STATE_DIM);
        a[(PX, VX)] = period;
        a[(PY, VY)] = period;
        a[(THETA, WZ)] = period;
        a
    }

    /// Diagonal process noise from the configured standard deviations.
    fn process_noise_matrix(config: &TrackerConfig) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(&[
            config.var_position(),
            config.var_position(),
            config.var_velocity(),
            config.var_velocity(),
            config.var_angular_rate(),
            config.var_heading(),
        ]))
    }

    /// Selection matrix mapping the state's velocity, angular-rate, and
    /// heading components onto the measurement vector. Position is not
    /// observed by this measurement model.
    fn measurement_matrix() -> DMatrix<f64> {
        let mut h = DMatrix::zeros(MEASUREMENT_DIM, STATE_DIM);
        h[(0, VX)] = 1.0;
        h[(1, VY)] = 1.0;
        h[(2, WZ)] = 1.0;
        h[(3, THETA)] = 1.0;
        h
    }

    /// Diagonal measurement noise: encoder angular noise propagated through
    /// the wheel radius into the velocity channels and through the offset
    /// geometry into the angular-rate channel, plus the inertial heading
    /// noise.
    fn measurement_noise_matrix(config: &TrackerConfig) -> DMatrix<f64> {
        let var_wheel = (config.wheel_radius * config.sigma_encoder_rate).powi(2);
        let var_rate = var_wheel / (config.offset_x.powi(2) + config.offset_y.powi(2));
        DMatrix::from_diagonal(&DVector::from_row_slice(&[
            var_wheel,
            var_wheel,
            var_rate,
            config.var_imu_heading(),
        ]))
    }
}

/// Point-in-time snapshot of the tracker outputs. This is the message shape
/// a motion-control loop or telemetry consumer reads each tick.
#[derive(Clone, Debug, Default)]
pub struct PoseEstimate {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub angular_velocity: f64,
    pub speed: f64,
}
