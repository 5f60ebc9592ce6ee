use nnet1d::{
    ActivationFunction, Dataset, EarlyStoppingConfig, Matrix, NetworkBuilder, NetworkConfig,
    Partition,
};

/// Windows of a noisy sine: 24 past samples in, the next 4 samples out.
fn windows(count: usize, offset: f64) -> Partition {
    let mut inputs = Vec::with_capacity(count);
    let mut targets = Vec::with_capacity(count);
    for i in 0..count {
        let start = offset + i as f64 * 0.37;
        let series: Vec<f64> = (0..28)
            .map(|t| {
                let x = start + t as f64 * 0.25;
                x.sin() * 0.8 + (x * 3.1).cos() * 0.1
            })
            .collect();
        inputs.push(series[..24].to_vec());
        targets.push(series[24..].to_vec());
    }
    Partition::from_rows(inputs, targets).expect("windows are rectangular")
}

fn main() -> nnet1d::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dataset = Dataset::new(windows(160, 0.0), windows(40, 100.0), windows(40, 200.0))?;
    let config = NetworkConfig::new(1234, 20, 0.05, 0.9);

    let mut builder = NetworkBuilder::new(config, dataset)?;
    builder
        .add_convolutional_pool_layer(8, 5, 2, ActivationFunction::Tanh)?
        .add_fully_connected_layer(Some(16), ActivationFunction::Tanh)?
        .add_fully_connected_layer(None, ActivationFunction::Identity)?;
    let mut network = builder.build()?;

    let stopping = EarlyStoppingConfig {
        patience: 20,
        max_epochs: 400,
        ..EarlyStoppingConfig::default()
    };
    let report = network.train_early_stopping(&stopping)?;
    println!(
        "stopped ({:?}) after {} epochs; best epoch {} valid {:.5} test {:.5}",
        report.stop_reason,
        report.epochs_run,
        report.best_epoch,
        report.best_valid_error,
        report.test_error
    );

    let sample = Matrix::from_rows(network.dataset().test.inputs.to_rows()[..3].to_vec())?;
    for (x, y) in sample.to_rows().iter().zip(network.output(&sample)?.to_rows()) {
        println!("... {:.3?} -> {:.3?}", &x[20..], y);
    }
    Ok(())
}
