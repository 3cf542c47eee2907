use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid frame format: {0}")]
    InvalidFrameFormat(String),

    #[error("Unsupported rotation: {0} degrees")]
    UnsupportedRotation(u32),

    #[error("Degenerate pose solve: {0}")]
    DegeneratePoseSolve(String),

    #[error("Invalid camera intrinsics: {0}")]
    InvalidIntrinsics(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode frame: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
