use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid camera intrinsics: {0}")]
    InvalidIntrinsics(String),

    #[error("Invalid tracker config: {0}")]
    InvalidConfig(String),
}
