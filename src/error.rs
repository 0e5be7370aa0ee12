#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No historical basis: the return distribution is empty")]
    NoHistoricalBasis,

    #[error("Date arithmetic overflow while projecting prices")]
    Overflow,

    #[error("Projection cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
