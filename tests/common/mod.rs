#![allow(dead_code)]

use nnet1d::{Dataset, Partition};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `rows` windows of a smooth signal, `n_in` samples in and `n_out` out.
pub fn series_partition(rows: usize, n_in: usize, n_out: usize, phase: f64) -> Partition {
    let mut inputs = Vec::with_capacity(rows);
    let mut targets = Vec::with_capacity(rows);
    for r in 0..rows {
        let start = phase + r as f64 * 0.31;
        let series: Vec<f64> = (0..n_in + n_out)
            .map(|t| (start + t as f64 * 0.2).sin() * 0.7)
            .collect();
        inputs.push(series[..n_in].to_vec());
        targets.push(series[n_in..].to_vec());
    }
    Partition::from_rows(inputs, targets).unwrap()
}

pub fn series_dataset(rows: [usize; 3], n_in: usize, n_out: usize) -> Dataset {
    Dataset::new(
        series_partition(rows[0], n_in, n_out, 0.0),
        series_partition(rows[1], n_in, n_out, 40.0),
        series_partition(rows[2], n_in, n_out, 80.0),
    )
    .unwrap()
}
