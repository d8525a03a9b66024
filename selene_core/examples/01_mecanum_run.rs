// selene_core/examples/01_mecanum_run.rs

//! A scripted mecanum drive run through the pose tracker.
//!
//! This example demonstrates how to:
//! 1. Load the tracker configuration from TOML.
//! 2. Feed per-tick wheel-odometry and inertial readings through the
//!    predict/update cycle.
//! 3. Apply an authoritative position fix mid-run with a known-value
//!    override.
//!
//! To run this example:
//! `cargo run --example 01_mecanum_run`

use selene_core::prelude::*;

// In a real application this would be read from a file on disk.
const CONFIG_TOML: &str = r#"
sample_period = 0.05
wheel_radius = 0.098
offset_x = 0.5
offset_y = 0.5
sigma_velocity = 0.1
sigma_encoder_rate = 0.001
"#;

fn main() {
    // --- 1. Load Tracker Configuration ---
    let config: TrackerConfig = toml::from_str(CONFIG_TOML).unwrap_or_else(|err| {
        panic!("Failed to parse tracker config: {}", err);
    });
    let mut tracker = PoseTracker::new(&config).unwrap_or_else(|err| {
        panic!("Tracker config rejected: {}", err);
    });

    // --- 2. Drive Straight ---
    // Two seconds of steady forward velocity, all sensors in agreement.
    for _ in 0..40 {
        tracker
            .update_measurement(0.8, 0.0, 0.0, 0.0)
            .expect("filter cycle failed");
    }
    print_estimate("after the straight", &tracker.estimate());

    // --- 3. Arc Through a Turn ---
    // The wheels report a right-handed angular rate and the inertial heading
    // integrates it; the tracker flips both into its clockwise-positive
    // convention internally.
    let wheel_rate = 0.5;
    let mut imu_heading = 0.0;
    for _ in 0..40 {
        imu_heading += wheel_rate * config.sample_period;
        tracker
            .update_measurement(0.8, 0.0, wheel_rate, imu_heading)
            .expect("filter cycle failed");
    }
    print_estimate("after the arc", &tracker.estimate());

    // --- 4. Apply an Absolute Fix ---
    // A perception collaborator spotted a landmark and pinned down x; the
    // override replaces that one component and re-inflates its variance.
    println!("vision fix: x pinned to 2.000 m");
    tracker.set_known_x_position(2.0);
    print_estimate("after the fix", &tracker.estimate());

    // --- 5. Keep Driving ---
    for _ in 0..20 {
        imu_heading += wheel_rate * config.sample_period;
        tracker
            .update_measurement(0.8, 0.0, wheel_rate, imu_heading)
            .expect("filter cycle failed");
    }
    print_estimate("final", &tracker.estimate());

    println!(
        "final heading {:.3} rad ({:.3} rad wrapped to [0, 2pi))",
        tracker.heading(),
        wrap_to_two_pi(tracker.heading())
    );
}

fn print_estimate(label: &str, estimate: &PoseEstimate) {
    println!(
        "{:<20} x {:>7.3} m  y {:>7.3} m  heading {:>7.3} rad  speed {:>6.3} m/s",
        label, estimate.x, estimate.y, estimate.heading, estimate.speed
    );
}
