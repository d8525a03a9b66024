// selene_core/src/estimation/filters/linear.rs

use nalgebra::DMatrix;

use crate::error::FilterError;
use crate::types::{Covariance, MeasurementVector, StateVector};

/// A linear Kalman filter over dynamically sized state and measurement spaces.
///
/// The filter owns its belief (state vector and covariance) across calls. The
/// structural matrices are bound once at construction; measurement noise is
/// supplied per update call, so callers may vary it over time.
pub struct LinearKalmanFilter {
    /// The state transition matrix (A), applied every predict step.
    transition: DMatrix<f64>,
    /// The process noise covariance (Q), added to the covariance every
    /// predict step.
    process_noise: DMatrix<f64>,
    /// The measurement matrix (H), mapping state space into measurement space.
    measurement_matrix: DMatrix<f64>,
    /// The current state estimate (x).
    state: StateVector,
    /// The current estimate covariance (P).
    covariance: Covariance,
    /// Set by predict, cleared when an update lands or the belief is reseeded.
    predicted: bool,
}

impl LinearKalmanFilter {
    /// Creates a filter bound to the given structural matrices.
    ///
    /// The belief starts at zero with zero covariance; callers seed it with
    /// `set_state`.
    ///
    /// # Panics
    /// Panics if `transition` and `process_noise` are not square matrices of
    /// the same dimension, or if `measurement_matrix` does not have that many
    /// columns.
    pub fn new(
        transition: DMatrix<f64>,
        process_noise: DMatrix<f64>,
        measurement_matrix: DMatrix<f64>,
    ) -> Self {
        // Ensure the structural matrices agree on the state dimension.
        let n = transition.nrows();
        assert_eq!(n, transition.ncols());
        assert_eq!(n, process_noise.nrows());
        assert_eq!(n, process_noise.ncols());
        assert_eq!(n, measurement_matrix.ncols());

        Self {
            state: StateVector::zeros(n),
            covariance: Covariance::zeros(n, n),
            transition,
            process_noise,
            measurement_matrix,
            predicted: false,
        }
    }

    /// Seeds or replaces the belief.
    ///
    /// Clears the predict pairing, so the next cycle must predict before it
    /// updates.
    ///
    /// # Panics
    /// Panics if the dimensions do not match the bound matrices.
    pub fn set_state(&mut self, state: StateVector, covariance: Covariance) {
        assert_eq!(self.state.nrows(), state.nrows());
        assert_eq!(self.covariance.nrows(), covariance.nrows());
        assert_eq!(self.covariance.ncols(), covariance.ncols());

        self.state = state;
        self.covariance = covariance;
        self.predicted = false;
    }

    /// The current state estimate. Read-only; the filter never hands out a
    /// mutable alias of its belief.
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// The current estimate covariance. Read-only.
    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }

    /// Advances the belief one step through the transition model:
    /// x <- A*x, P <- A*P*A^T + Q.
    ///
    /// Calling predict twice without an intervening update double-advances
    /// the model. The filter does not guard against that; pair every predict
    /// with an update.
    pub fn predict(&mut self) {
        self.state = &self.transition * &self.state;
        self.covariance =
            &self.transition * &self.covariance * self.transition.transpose() + &self.process_noise;
        self.predicted = true;
    }

    /// Folds a measurement with its noise covariance into the belief.
    ///
    /// Fails with `UpdateWithoutPredict` when no predict has run since the
    /// last update or reseed, and with `SingularInnovationCovariance` when
    /// the innovation covariance cannot be inverted; the belief is untouched
    /// in both cases. Fails with `NonPositiveDefiniteCovariance` when the
    /// updated covariance comes out with a negative variance; by then the
    /// belief has already been overwritten and should not be trusted.
    pub fn update(
        &mut self,
        measurement: &MeasurementVector,
        noise: &Covariance,
    ) -> Result<(), FilterError> {
        if !self.predicted {
            return Err(FilterError::UpdateWithoutPredict);
        }

        // 1. Innovation and its covariance.
        let y = measurement - &self.measurement_matrix * &self.state;
        let s = &self.measurement_matrix * &self.covariance * self.measurement_matrix.transpose()
            + noise;

        // 2. Kalman gain. S is small (measurement-sized), so a direct
        //    inverse is fine.
        let s_inv = match s.try_inverse() {
            Some(inv) => inv,
            None => {
                log::warn!("innovation covariance is singular, measurement dropped");
                return Err(FilterError::SingularInnovationCovariance);
            }
        };
        let k_gain = &self.covariance * self.measurement_matrix.transpose() * s_inv;

        // 3. Fold the innovation into the belief.
        self.state += &k_gain * y;
        let n = self.state.nrows();
        let i = DMatrix::<f64>::identity(n, n);
        self.covariance = (i - k_gain * &self.measurement_matrix) * &self.covariance;

        // Tiny numerical errors can make P slightly non-symmetric. Force it
        // back.
        self.covariance = (&self.covariance + self.covariance.transpose()) * 0.5;

        self.predicted = false;

        // A negative variance on the diagonal is unambiguous corruption.
        if self.covariance.diagonal().iter().any(|v| *v < 0.0) {
            log::warn!("covariance picked up a negative variance after update");
            return Err(FilterError::NonPositiveDefiniteCovariance);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    // Constant-velocity model over [position, velocity] with a unit timestep.
    fn constant_velocity_filter(process_noise: f64) -> LinearKalmanFilter {
        LinearKalmanFilter::new(
            DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]),
            DMatrix::from_diagonal(&DVector::from_element(2, process_noise)),
            DMatrix::from_row_slice(1, 2, &[1.0, 0.0]),
        )
    }

    // One-dimensional random walk observed directly.
    fn scalar_filter(process_noise: f64) -> LinearKalmanFilter {
        LinearKalmanFilter::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, process_noise),
            DMatrix::from_element(1, 1, 1.0),
        )
    }

    #[test]
    fn test_predict_advances_constant_velocity() {
        let mut filter = constant_velocity_filter(0.0);
        filter.set_state(
            DVector::from_row_slice(&[0.0, 1.0]),
            DMatrix::identity(2, 2),
        );

        filter.predict();

        assert_eq!(filter.state()[0], 1.0);
        assert_eq!(filter.state()[1], 1.0);
    }

    #[test]
    fn test_predict_twice_double_advances() {
        // A second predict with no update in between moves the model again.
        let mut filter = constant_velocity_filter(0.0);
        filter.set_state(
            DVector::from_row_slice(&[0.0, 1.0]),
            DMatrix::identity(2, 2),
        );

        filter.predict();
        filter.predict();

        assert_eq!(filter.state()[0], 2.0);
    }

    #[test]
    fn test_update_without_predict_is_rejected() {
        let mut filter = scalar_filter(0.1);
        filter.set_state(DVector::from_element(1, 0.0), DMatrix::identity(1, 1));

        let z = DVector::from_element(1, 1.0);
        let r = DMatrix::from_element(1, 1, 1.0);

        assert!(matches!(
            filter.update(&z, &r),
            Err(FilterError::UpdateWithoutPredict)
        ));

        // A full cycle goes through, but a second update against the same
        // predict does not.
        filter.predict();
        assert!(filter.update(&z, &r).is_ok());
        assert!(matches!(
            filter.update(&z, &r),
            Err(FilterError::UpdateWithoutPredict)
        ));
    }

    #[test]
    fn test_reseed_requires_fresh_predict() {
        let mut filter = scalar_filter(0.1);
        filter.set_state(DVector::from_element(1, 0.0), DMatrix::identity(1, 1));
        filter.predict();

        // Reseeding consumes the pending predict.
        filter.set_state(DVector::from_element(1, 2.0), DMatrix::identity(1, 1));

        let z = DVector::from_element(1, 1.0);
        let r = DMatrix::from_element(1, 1, 1.0);
        assert!(matches!(
            filter.update(&z, &r),
            Err(FilterError::UpdateWithoutPredict)
        ));
    }

    #[test]
    fn test_update_applies_known_scalar_gain() {
        // With P = 1 and R = 1 the gain is exactly one half.
        let mut filter = scalar_filter(0.0);
        filter.set_state(DVector::from_element(1, 0.0), DMatrix::identity(1, 1));

        filter.predict();
        filter
            .update(
                &DVector::from_element(1, 1.0),
                &DMatrix::from_element(1, 1, 1.0),
            )
            .unwrap();

        assert_eq!(filter.state()[0], 0.5);
        assert_eq!(filter.covariance()[(0, 0)], 0.5);
    }

    #[test]
    fn test_update_reduces_uncertainty() {
        let mut filter = constant_velocity_filter(0.1);
        filter.set_state(DVector::zeros(2), DMatrix::identity(2, 2));

        filter.predict();
        let predicted_diag = filter.covariance().diagonal();

        filter
            .update(
                &DVector::from_element(1, 1.0),
                &DMatrix::from_element(1, 1, 0.5),
            )
            .unwrap();
        let updated_diag = filter.covariance().diagonal();

        for i in 0..2 {
            assert!(
                updated_diag[i] <= predicted_diag[i],
                "variance {} grew from {} to {}",
                i,
                predicted_diag[i],
                updated_diag[i]
            );
        }

        // The update also keeps the covariance symmetric.
        assert_eq!(filter.covariance()[(0, 1)], filter.covariance()[(1, 0)]);
    }

    #[test]
    fn test_singular_innovation_is_reported() {
        // Zero prior covariance and zero noise make S exactly singular.
        let mut filter = scalar_filter(0.0);
        filter.set_state(DVector::from_element(1, 0.5), DMatrix::zeros(1, 1));

        filter.predict();
        let result = filter.update(
            &DVector::from_element(1, 1.0),
            &DMatrix::from_element(1, 1, 0.0),
        );

        assert!(matches!(
            result,
            Err(FilterError::SingularInnovationCovariance)
        ));
        // The belief is left as it was.
        assert_eq!(filter.state()[0], 0.5);
        assert_eq!(filter.covariance()[(0, 0)], 0.0);
    }

    #[test]
    fn test_corrupted_covariance_is_reported() {
        // A seeded negative variance survives the predict and drives the
        // updated covariance negative as well.
        let mut filter = scalar_filter(0.0);
        filter.set_state(
            DVector::from_element(1, 0.0),
            DMatrix::from_element(1, 1, -0.5),
        );

        filter.predict();
        let result = filter.update(
            &DVector::from_element(1, 1.0),
            &DMatrix::from_element(1, 1, 1.0),
        );

        assert!(matches!(
            result,
            Err(FilterError::NonPositiveDefiniteCovariance)
        ));
    }
}
