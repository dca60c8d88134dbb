//! Classroom voting booth
//!
//! Candidates are registered on a roster, each voter casts a ballot naming
//! two different candidates, and tallies are reported. State is kept in a
//! local key-value store and rewritten after every change.

pub mod admin;
pub mod ballot;
pub mod booth;
pub mod config;
pub mod errors;
pub mod persistence;
pub mod report;
pub mod roster;
pub mod storage;
pub mod tally;
pub mod types;

// Re-export commonly used types
pub use ballot::BallotRequest;
pub use booth::{VotingBooth, VotingSession};
pub use config::{BallotVariant, Config};
pub use errors::{Error, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
pub fn init() -> Result<()> {
    init_with(&config::LoggingConfig::default())
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level. A `compact` format
/// selects single-line output; anything else gets the default formatter.
pub fn init_with(logging: &config::LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("classvote={}", logging.level).into());

    let installed = if logging.format == "compact" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.map_err(|e| Error::internal(format!("Logging already initialized: {e}")))?;

    tracing::info!("🗳️  Classroom voting booth v{} initialized", VERSION);
    Ok(())
}

/// Open a booth backed by the file store described by `config`
pub fn open_file_booth(config: &Config) -> Result<VotingBooth<FileStore>> {
    let store = FileStore::open(&config.storage.data_dir)?;
    VotingBooth::open(config.voting.clone(), store)
}
