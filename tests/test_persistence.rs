// Tests for saving and restoring configurations and complete networks.

mod common;

use nnet1d::{
    ActivationFunction, Error, LossType, Network, NetworkBuilder, NetworkConfig, Precision,
};

use common::series_dataset;

fn trained_network() -> Network {
    let config = NetworkConfig::new(99, 4, 0.1, 0.8).with_cost(LossType::Huber);
    let mut builder = NetworkBuilder::new(config, series_dataset([12, 8, 8], 14, 2)).unwrap();
    builder
        .add_convolutional_pool_layer(3, 3, 3, ActivationFunction::Tanh)
        .unwrap()
        .add_fully_connected_layer(Some(4), ActivationFunction::Sigmoid)
        .unwrap()
        .add_fully_connected_layer(None, ActivationFunction::Identity)
        .unwrap();
    let mut network = builder.build().unwrap();
    for _ in 0..2 {
        network.train().unwrap();
    }
    network
}

#[test]
fn network_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();

    let mut network = trained_network();
    network.save_json(path).unwrap();
    let mut loaded = Network::load_json(path).unwrap();

    assert_eq!(loaded.config(), network.config());
    assert_eq!(loaded.layers(), network.layers());
    assert_eq!(loaded.dataset(), network.dataset());
    assert_eq!(loaded.plan(), network.plan());
    assert_eq!(loaded.state(), network.state());

    // velocities came along, so the next epoch is identical too
    assert_eq!(loaded.train().unwrap().valid_error, network.train().unwrap().valid_error);
}

#[test]
fn tampered_head_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();
    trained_network().save_json(path).unwrap();

    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    value["layers"][2]["FullyConnected"]["output_length"] = serde_json::json!(7);
    std::fs::write(path, value.to_string()).unwrap();

    assert!(matches!(Network::load_json(path), Err(Error::ShapeMismatch(_))));
}

#[test]
fn mismatched_parameters_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();
    trained_network().save_json(path).unwrap();

    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    value["layers"][1]["FullyConnected"]["input_length"] = serde_json::json!(5);
    std::fs::write(path, value.to_string()).unwrap();

    assert!(matches!(Network::load_json(path), Err(Error::TypeConsistency(_))));
}

fn tamper(path: &str, edit: impl FnOnce(&mut serde_json::Value)) {
    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    edit(&mut value);
    std::fs::write(path, value.to_string()).unwrap();
}

#[test]
fn truncated_parameter_buffer_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();
    trained_network().save_json(path).unwrap();

    tamper(path, |v| v["state"]["params"][0]["weights"]["data"] = serde_json::json!([0.5]));
    assert!(matches!(Network::load_json(path), Err(Error::Json(_))));
}

#[test]
fn misaligned_partition_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();
    trained_network().save_json(path).unwrap();

    tamper(path, |v| {
        v["dataset"]["valid"]["targets"] = serde_json::json!({"rows": 1, "cols": 2, "data": [0.0, 0.0]})
    });
    assert!(matches!(Network::load_json(path), Err(Error::Json(_))));
}

#[test]
fn partition_shorter_than_a_batch_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();
    trained_network().save_json(path).unwrap();

    tamper(path, |v| {
        v["dataset"]["test"] = serde_json::json!({
            "inputs": {"rows": 2, "cols": 14, "data": vec![0.0; 28]},
            "targets": {"rows": 2, "cols": 2, "data": vec![0.0; 4]},
        })
    });
    assert!(matches!(Network::load_json(path), Err(Error::InvalidDataset(_))));
}

#[test]
fn config_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    let config = NetworkConfig::new(7, 16, 0.02, 0.95)
        .with_cost(LossType::Mae)
        .with_precision(Precision::Double);
    config.save_json(path).unwrap();
    assert_eq!(NetworkConfig::load_json(path).unwrap(), config);
}

#[test]
fn missing_model_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(matches!(Network::load_json(path.to_str().unwrap()), Err(Error::Io(_))));
}
