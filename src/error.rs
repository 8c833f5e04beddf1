use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("settings error: {message}")]
    Settings { message: String },
    #[error("connection pool needs at least one connection, got {size}")]
    PoolSize { size: usize },
    #[error("all {size} pooled connections are in use")]
    PoolExhausted { size: usize },
    #[error("unknown user '{name}'")]
    UnknownUser { name: String },
    #[error("user store is unusable after a panic")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
