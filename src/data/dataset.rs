use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::config::{Precision, RemainderPolicy};

/// Which of the three dataset partitions a batch is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
    Train,
    Valid,
    Test,
}

impl PartitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            PartitionKind::Train => "train",
            PartitionKind::Valid => "valid",
            PartitionKind::Test => "test",
        }
    }
}

/// Row-aligned input and target arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PartitionFields")]
pub struct Partition {
    pub inputs: Matrix,
    pub targets: Matrix,
}

#[derive(Deserialize)]
struct PartitionFields {
    inputs: Matrix,
    targets: Matrix,
}

impl TryFrom<PartitionFields> for Partition {
    type Error = Error;

    fn try_from(fields: PartitionFields) -> Result<Partition> {
        Partition::new(fields.inputs, fields.targets)
    }
}

impl Partition {
    pub fn new(inputs: Matrix, targets: Matrix) -> Result<Partition> {
        if inputs.rows != targets.rows {
            return Err(Error::InvalidDataset(format!(
                "{} input rows but {} target rows",
                inputs.rows, targets.rows
            )));
        }
        Ok(Partition { inputs, targets })
    }

    pub fn from_rows(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Partition> {
        Partition::new(Matrix::from_rows(inputs)?, Matrix::from_rows(targets)?)
    }

    pub fn len(&self) -> usize {
        self.inputs.rows
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.rows == 0
    }

    /// Number of whole batches; a trailing partial batch is not counted.
    pub fn n_batches(&self, batch_size: usize) -> usize {
        self.len() / batch_size
    }

    /// Rows `[i·batch_size, (i+1)·batch_size)` of inputs and targets.
    /// Callers check `i < n_batches(batch_size)`.
    pub fn batch(&self, i: usize, batch_size: usize) -> (Matrix, Matrix) {
        let start = i * batch_size;
        let end = start + batch_size;
        (
            self.inputs.slice_rows(start, end),
            self.targets.slice_rows(start, end),
        )
    }

    fn coerce(self, precision: Precision) -> Partition {
        Partition {
            inputs: precision.coerce_matrix(self.inputs),
            targets: precision.coerce_matrix(self.targets),
        }
    }
}

type RawPartition = (Vec<Vec<f64>>, Vec<Vec<f64>>);

/// Train, validation and test partitions sharing input/target widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetFields")]
pub struct Dataset {
    pub train: Partition,
    pub valid: Partition,
    pub test: Partition,
}

#[derive(Deserialize)]
struct DatasetFields {
    train: Partition,
    valid: Partition,
    test: Partition,
}

impl TryFrom<DatasetFields> for Dataset {
    type Error = Error;

    fn try_from(fields: DatasetFields) -> Result<Dataset> {
        Dataset::new(fields.train, fields.valid, fields.test)
    }
}

impl Dataset {
    pub fn new(train: Partition, valid: Partition, test: Partition) -> Result<Dataset> {
        if train.is_empty() {
            return Err(Error::InvalidDataset("training partition is empty".into()));
        }
        let (n_in, n_out) = (train.inputs.cols, train.targets.cols);
        if n_in == 0 || n_out == 0 {
            return Err(Error::InvalidDataset(format!(
                "inputs and targets need at least one column (got {} and {})",
                n_in, n_out
            )));
        }
        for (kind, part) in [(PartitionKind::Valid, &valid), (PartitionKind::Test, &test)] {
            if part.is_empty() {
                continue;
            }
            if part.inputs.cols != n_in || part.targets.cols != n_out {
                return Err(Error::InvalidDataset(format!(
                    "{} partition is {}→{} wide, training partition is {}→{}",
                    kind.name(),
                    part.inputs.cols,
                    part.targets.cols,
                    n_in,
                    n_out
                )));
            }
        }
        Ok(Dataset { train, valid, test })
    }

    /// Input row width.
    pub fn n_in(&self) -> usize {
        self.train.inputs.cols
    }

    /// Target row width.
    pub fn n_out(&self) -> usize {
        self.train.targets.cols
    }

    pub fn partition(&self, kind: PartitionKind) -> &Partition {
        match kind {
            PartitionKind::Train => &self.train,
            PartitionKind::Valid => &self.valid,
            PartitionKind::Test => &self.test,
        }
    }

    /// Enforces `policy` for `batch_size` across all three partitions. Every
    /// partition must also hold at least one whole batch.
    pub fn check_remainder(&self, batch_size: usize, policy: RemainderPolicy) -> Result<()> {
        for kind in [PartitionKind::Train, PartitionKind::Valid, PartitionKind::Test] {
            let rows = self.partition(kind).len();
            if rows < batch_size {
                return Err(Error::InvalidDataset(format!(
                    "{} partition has {} rows, fewer than one batch of {}",
                    kind.name(),
                    rows,
                    batch_size
                )));
            }
            if policy == RemainderPolicy::Reject && rows % batch_size != 0 {
                return Err(Error::InvalidDataset(format!(
                    "{} partition has {} rows, not a multiple of batch size {}",
                    kind.name(),
                    rows,
                    batch_size
                )));
            }
        }
        Ok(())
    }

    /// Reads a JSON archive `[[train_x, train_y], [valid_x, valid_y], [test_x, test_y]]`
    /// and rounds every value to `precision`.
    pub fn load_json(path: &str, precision: Precision) -> Result<Dataset> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let (train, valid, test): (RawPartition, RawPartition, RawPartition) =
            serde_json::from_reader(reader)?;
        Dataset::from_raw(train, valid, test, precision)
    }

    /// Writes the archive format read by `load_json`.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let raw = [&self.train, &self.valid, &self.test]
            .map(|p| (p.inputs.to_rows(), p.targets.to_rows()));
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, &raw)?;
        Ok(())
    }

    fn from_raw(
        train: RawPartition,
        valid: RawPartition,
        test: RawPartition,
        precision: Precision,
    ) -> Result<Dataset> {
        let load = |(x, y): RawPartition| -> Result<Partition> {
            Ok(Partition::from_rows(x, y)?.coerce(precision))
        };
        Dataset::new(load(train)?, load(valid)?, load(test)?)
    }
}
