//! Configuration management for the voting booth
//!
//! Loads settings from environment variables (and a `.env` file if present)
//! with validation.

use crate::admin::AdminGate;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default shared admin password
const DEFAULT_ADMIN_PASSWORD: &str = "1234";

/// Default minimum roster size for a voting session
const DEFAULT_MIN_CANDIDATES: usize = 2;

/// Default directory for the file store
const DEFAULT_DATA_DIR: &str = "vote-data";

/// What a ballot records about the person casting it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallotVariant {
    /// Voter is a roster candidate; one ballot per voter
    Identified,
    /// Voter gives a free-form grade label; no duplicate prevention
    Graded,
}

impl BallotVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identified => "identified",
            Self::Graded => "graded",
        }
    }
}

impl std::str::FromStr for BallotVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identified" => Ok(Self::Identified),
            "graded" => Ok(Self::Graded),
            other => Err(Error::internal(format!(
                "Invalid VOTE_BALLOT_VARIANT: {other} (expected identified or graded)"
            ))),
        }
    }
}

/// Voting rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// Ballot variant in force for this booth
    pub variant: BallotVariant,

    /// Roster size required before a session can open
    pub min_candidates: usize,

    /// BLAKE3 digest of the admin password, hex encoded
    pub admin_password_digest: String,
}

impl VotingConfig {
    /// Load voting rules from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let variant = std::env::var("VOTE_BALLOT_VARIANT")
            .unwrap_or_else(|_| BallotVariant::Identified.as_str().to_string())
            .parse()?;

        let min_candidates = std::env::var("VOTE_MIN_CANDIDATES")
            .unwrap_or_else(|_| DEFAULT_MIN_CANDIDATES.to_string())
            .parse()
            .map_err(|_| Error::internal("Invalid VOTE_MIN_CANDIDATES"))?;

        Self::validate_min_candidates(min_candidates)?;

        let admin_password_digest = match std::env::var("VOTE_ADMIN_PASSWORD_BLAKE3") {
            Ok(digest) => {
                Self::validate_digest(&digest, "VOTE_ADMIN_PASSWORD_BLAKE3")?;
                digest.to_ascii_lowercase()
            }
            Err(_) => {
                let password = std::env::var("VOTE_ADMIN_PASSWORD")
                    .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
                AdminGate::digest_hex(&password)
            }
        };

        Ok(Self {
            variant,
            min_candidates,
            admin_password_digest,
        })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Self {
        Self {
            variant: BallotVariant::Identified,
            min_candidates: DEFAULT_MIN_CANDIDATES,
            admin_password_digest: AdminGate::digest_hex(DEFAULT_ADMIN_PASSWORD),
        }
    }

    /// Switch the ballot variant
    pub fn with_variant(mut self, variant: BallotVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Build the admin gate from the configured digest
    pub fn admin_gate(&self) -> Result<AdminGate> {
        AdminGate::from_digest_hex(&self.admin_password_digest)
    }

    fn validate_min_candidates(min_candidates: usize) -> Result<()> {
        if min_candidates < 2 {
            return Err(Error::internal(
                "VOTE_MIN_CANDIDATES must be at least 2 (each ballot names two candidates)",
            ));
        }
        Ok(())
    }

    /// Validate a hex-encoded 32-byte digest
    fn validate_digest(digest: &str, name: &str) -> Result<()> {
        let decoded =
            hex::decode(digest).map_err(|_| Error::internal(format!("{name} must be valid hex")))?;

        if decoded.len() != 32 {
            return Err(Error::internal(format!("{name} must decode to 32 bytes")));
        }

        Ok(())
    }
}

/// Storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub voting: VotingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self> {
        let voting = VotingConfig::from_env()?;

        let storage = StorageConfig {
            data_dir: std::env::var("VOTE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
        };

        let logging = LoggingConfig {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        };

        Ok(Self {
            voting,
            storage,
            logging,
        })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Self {
        let storage = StorageConfig {
            data_dir: std::env::temp_dir().join(format!("classvote-{}", uuid::Uuid::new_v4())),
        };

        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };

        Self {
            voting: VotingConfig::for_testing(),
            storage,
            logging,
        }
    }
}
