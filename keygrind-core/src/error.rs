use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeygrindError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{field} contains '{character}', which is not a base58 character")]
    InvalidPattern { field: &'static str, character: char },

    #[error("at least one of starts_with or ends_with is required")]
    EmptyPattern,

    #[error("count must be at least 1")]
    InvalidCount,

    #[error("iteration_bits must be between {min} and {max}, got {got}")]
    InvalidIterationBits { min: u8, max: u8, got: u8 },

    #[error("no OpenCL devices available")]
    NoDevices,

    #[error("device selection failed: {0}")]
    DeviceSelection(String),

    #[error("OpenCL error: {0}")]
    OpenCl(#[from] ocl::Error),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("worker {index} failed: {message}")]
    WorkerFailed { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, KeygrindError>;
