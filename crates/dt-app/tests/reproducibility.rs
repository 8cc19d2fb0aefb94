//! The canonical experiment reproduces the measured drain times.

use dt_app::{ExperimentConfig, compare_measured, run_trial, summarize, sweep_average_velocity};
use dt_sim::TerminalState;

#[test]
fn point_two_metre_tube_within_ten_percent() {
    let config = ExperimentConfig::bin_drain_v1();
    let response = run_trial(&config, 0.2, false).expect("valid configuration");

    let predicted = response.report.predicted_time_s.expect("run converges");
    let error = (predicted - 214.0).abs() / 214.0;
    assert!(error <= 0.10, "predicted {predicted:.1} s vs measured 214 s");
}

#[test]
fn predictions_rise_with_tube_length() {
    let config = ExperimentConfig::bin_drain_v1();
    let rows = compare_measured(&config, false).expect("valid configuration");

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.state == TerminalState::Converged));

    let summary = summarize(&rows);
    assert_eq!(summary.predicted, 4);
    assert!(summary.monotonic_in_length, "{rows:?}");

    for row in rows.iter().filter(|r| r.tube_length_m >= 0.2) {
        let pe = row.percent_error.expect("converged rows carry an error");
        assert!(pe.abs() <= 10.0, "L = {} m: {pe:.1} %", row.tube_length_m);
    }
}

#[test]
fn t_joint_lengthens_every_prediction() {
    let config = ExperimentConfig::bin_drain_v1();
    let plain = compare_measured(&config, false).unwrap();
    let joint = compare_measured(&config, true).unwrap();
    for (a, b) in plain.iter().zip(&joint) {
        assert!(b.predicted_time_s.unwrap() > a.predicted_time_s.unwrap());
    }
}

#[test]
fn sweep_is_ordered_and_velocity_falls_with_length() {
    let config = ExperimentConfig {
        dt_s: 0.05,
        ..ExperimentConfig::bin_drain_v1()
    };
    let points = sweep_average_velocity(&config, &[0.9, 0.1, 0.5, 1.3], false).unwrap();

    let lengths: Vec<f64> = points.iter().map(|p| p.tube_length_m).collect();
    assert_eq!(lengths, vec![0.1, 0.5, 0.9, 1.3]);

    let velocities: Vec<f64> = points
        .iter()
        .map(|p| p.mean_outlet_velocity_mps.expect("records exist"))
        .collect();
    assert!(velocities.windows(2).all(|w| w[1] < w[0]), "{velocities:?}");
}
