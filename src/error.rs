use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The error type observers hand back to the training loop.
pub type BoxErr = Box<dyn Error + Send + Sync>;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, NnErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum NnErr {
    InvalidLayerSizes {
        sizes: Vec<usize>,
    },
    InvalidTrainingConfig(String),
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    Shape(ndarray::ShapeError),
    Init(String),
    EmptyDataset,
    SampleCountMismatch {
        inputs: usize,
        targets: usize,
    },
    RaggedDataset {
        what: &'static str,
        sample: usize,
        got: usize,
        expected: usize,
    },
    Observer {
        step: usize,
        source: BoxErr,
    },
    NonFinite {
        step: usize,
        what: &'static str,
    },
    Config(String),
    Io(io::Error),
}

impl Display for NnErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NnErr::InvalidLayerSizes { sizes } => write!(
                f,
                "invalid layer sizes {sizes:?}, expected at least 2 layers of width >= 1"
            ),
            NnErr::InvalidTrainingConfig(msg) => write!(f, "invalid training config: {msg}"),
            NnErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "there's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            NnErr::Shape(e) => write!(f, "shape error: {e}"),
            NnErr::Init(msg) => write!(f, "failed to initialize parameters: {msg}"),
            NnErr::EmptyDataset => write!(f, "the dataset has no samples"),
            NnErr::SampleCountMismatch { inputs, targets } => write!(
                f,
                "the dataset has {inputs} inputs but {targets} targets"
            ),
            NnErr::RaggedDataset {
                what,
                sample,
                got,
                expected,
            } => write!(
                f,
                "sample {sample} has {what} width {got}, expected {expected}"
            ),
            NnErr::Observer { step, source } => {
                write!(f, "the step observer failed at step {step}: {source}")
            }
            NnErr::NonFinite { step, what } => {
                write!(f, "non finite {what} at step {step}")
            }
            NnErr::Config(msg) => write!(f, "invalid session config: {msg}"),
            NnErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for NnErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NnErr::Shape(e) => Some(e),
            NnErr::Observer { source, .. } => Some(source.as_ref()),
            NnErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ndarray::ShapeError> for NnErr {
    fn from(value: ndarray::ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<io::Error> for NnErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for NnErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}
