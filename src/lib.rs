pub mod app;
pub mod cli;
pub mod environment;
pub mod error;
pub mod key;
pub mod signature;

pub use environment::Environment;
pub use key::Key;
