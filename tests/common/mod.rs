#![allow(dead_code)]

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use motility::aggregation::ConditionSummary;
use motility::config::Configuration;
use motility::constants::TrackId;
use motility::sample::{RawSample, TrajectorySample};

/// `n_tracks` tracks moving along +x at `step` per slice, each one offset in y.
pub fn straight_line_sample(label: &str, n_tracks: usize, len: usize, step: f64) -> RawSample {
    let tracks = (0..n_tracks).map(|k| {
        let y0 = 10.0 * k as f64;
        (
            (k + 1) as TrackId,
            (0..len).map(move |i| (step * i as f64, y0)).collect::<Vec<_>>(),
        )
    });
    let sample = TrajectorySample::from_positions(label, tracks, 1).unwrap();
    RawSample::from(&sample)
}

/// Random walks with Gaussian-ish steps, reproducible from `seed`.
pub fn random_walk_sample(
    label: &str,
    n_tracks: usize,
    len: usize,
    step: f64,
    seed: u64,
) -> RawSample {
    let mut rng = StdRng::seed_from_u64(seed);
    let tracks: Vec<(TrackId, Vec<(f64, f64)>)> = (0..n_tracks)
        .map(|k| {
            let mut pos = (0.0, 0.0);
            let path = (0..len)
                .map(|_| {
                    let current = pos;
                    let angle = rng.random::<f64>() * std::f64::consts::TAU;
                    let length = step * (0.5 + rng.random::<f64>());
                    pos = (pos.0 + length * angle.cos(), pos.1 + length * angle.sin());
                    current
                })
                .collect();
            ((k + 1) as TrackId, path)
        })
        .collect();
    let sample = TrajectorySample::from_positions(label, tracks, 1).unwrap();
    RawSample::from(&sample)
}

pub fn params(n_time_points: usize, n_tracks: usize, n_plot_points: usize) -> Configuration {
    Configuration::builder()
        .time_interval(1.0)
        .n_time_points(n_time_points)
        .n_tracks(n_tracks)
        .n_plot_points(n_plot_points)
        .build()
        .unwrap()
}

/// Compare the means of a summary, point by point, skipping `None` expectations.
pub fn assert_means_close(summary: &ConditionSummary, expected: &[Option<f64>], epsilon: f64) {
    assert_eq!(summary.points.len(), expected.len(), "{}", summary.label);
    for (point, want) in summary.points.iter().zip(expected) {
        match want {
            Some(want) => {
                let stats = point.stats.expect("point without data");
                assert_relative_eq!(stats.mean, *want, epsilon = epsilon);
            }
            None => assert!(point.stats.is_none(), "expected no data at x = {}", point.x),
        }
    }
}
