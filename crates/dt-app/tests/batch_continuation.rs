//! Batches keep going when one tube length is rejected or does not converge.

use dt_app::{ExperimentConfig, Measurement, compare_measured, sweep_average_velocity};
use dt_sim::TerminalState;

fn coarse() -> ExperimentConfig {
    ExperimentConfig {
        dt_s: 0.05,
        ..ExperimentConfig::bin_drain_v1()
    }
}

#[test]
fn sweep_keeps_valid_lengths_around_a_rejected_one() {
    let points = sweep_average_velocity(&coarse(), &[0.2, 0.0, 0.4], false)
        .expect("experiment itself is valid");

    assert_eq!(points.len(), 3);
    let lengths: Vec<f64> = points.iter().map(|p| p.tube_length_m).collect();
    assert_eq!(lengths, vec![0.0, 0.2, 0.4]);

    let rejected = &points[0];
    assert_eq!(rejected.state, TerminalState::Failed);
    assert_eq!(rejected.mean_outlet_velocity_mps, None);
    assert_eq!(rejected.drain_time_s, None);
    assert!(
        rejected
            .failure
            .as_deref()
            .is_some_and(|f| f.contains("tube length")),
        "{rejected:?}"
    );

    for p in &points[1..] {
        assert_eq!(p.state, TerminalState::Converged);
        assert!(p.drain_time_s.is_some());
        assert!(p.mean_outlet_velocity_mps.is_some());
        assert!(p.failure.is_none());
    }
}

#[test]
fn sweep_rejects_an_invalid_experiment_up_front() {
    let config = ExperimentConfig {
        tube_diameter_m: -1.0,
        ..coarse()
    };
    assert!(sweep_average_velocity(&config, &[0.2, 0.4], false).is_err());
}

#[test]
fn comparison_keeps_rows_after_a_timed_out_point() {
    let config = ExperimentConfig {
        time_cap_s: 230.0,
        measurements: vec![
            Measurement {
                tube_length_m: 0.6,
                measured_time_s: 288.0,
            },
            Measurement {
                tube_length_m: 0.2,
                measured_time_s: 214.0,
            },
        ],
        ..coarse()
    };

    let rows = compare_measured(&config, false).expect("experiment itself is valid");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].state, TerminalState::TimedOut);
    assert_eq!(rows[0].predicted_time_s, None);
    assert_eq!(rows[0].percent_error, None);

    assert_eq!(rows[1].state, TerminalState::Converged);
    assert!(rows[1].predicted_time_s.is_some());
    assert!(rows[1].percent_error.is_some());
}
