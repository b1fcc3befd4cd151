use std::{io, path::PathBuf};

/// Errors returned by the simulation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the body table needs a capacity of at least one")]
    ZeroCapacity,
    #[error("mass has to be positive and finite, got {0}")]
    NonPositiveMass(f64),
    #[error("{field} has to be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("raw buffer of length {len} is not a count followed by whole bodies")]
    RawLength { len: usize },
    #[error("raw buffer count {count} exceeds capacity {capacity}")]
    CountOutOfRange { count: f64, capacity: usize },
    #[error("could not read configuration file {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse configuration")]
    ConfigParse(#[from] toml::de::Error),
    #[error("could not spawn the integration engine thread")]
    Spawn(#[source] io::Error),
    #[error("the integration engine is already running")]
    AlreadyRunning,
    #[error("the integration engine is not running")]
    NotRunning,
    #[error("the integration engine thread panicked")]
    EnginePanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
