use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameClubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Unknown kind: {0}")]
    UnknownKind(String),
}
