// selene_core/src/types.rs

use nalgebra::{DMatrix, DVector};

// --- Core Type Aliases ---
pub type StateVector = DVector<f64>;
pub type Covariance = DMatrix<f64>;
pub type MeasurementVector = DVector<f64>;
