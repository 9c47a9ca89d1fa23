use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format: {0:?}")]
    UnknownFormat(String),
    #[error("sampling rate must be positive, got {0}")]
    InvalidSampleRate(u32),
    #[error("Unable to write profile")]
    Io(#[from] std::io::Error),
}
