//! # Bestiary
//!
//! A creature catalog with environment filtering and random encounter generation.
//!
//! ## Architecture Overview
//!
//! The crate is organised as a small pipeline over an immutable catalog:
//!
//! - **Catalog**: creature records, their named statblocks and image references,
//!   loaded once from a bulk JSON import
//! - **Filter**: environment (climate/terrain) and setting predicates
//! - **Quantity**: the "No. Appearing" expression parser and resolver
//! - **Encounter**: random sampling of matching creatures, each with a resolved count
//!
//! Randomness is always injected as a [`rand::Rng`], so a seeded
//! [`rand::rngs::StdRng`] reproduces any encounter exactly.

pub mod catalog;
pub mod encounter;
pub mod filter;
pub mod quantity;

pub use catalog::*;
pub use encounter::*;
pub use filter::*;
pub use quantity::*;

/// Core error type for the bestiary engine.
#[derive(thiserror::Error, Debug)]
pub enum BestiaryError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A raw record could not be turned into a creature record
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Lookup by key found nothing
    #[error("Unknown creature key: {0}")]
    UnknownCreatureKey(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the bestiary codebase.
pub type BestiaryResult<T> = Result<T, BestiaryError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog and encounter configuration constants.
pub mod config {
    /// Default location of the bulk import file
    pub const DEFAULT_CATALOG_PATH: &str = "ALL_MONSTERS.json";

    /// Default number of distinct creatures in a generated encounter
    pub const DEFAULT_ENCOUNTER_SIZE: usize = 3;

    /// Count used whenever a quantity expression cannot be resolved
    pub const DEFAULT_APPEARING: u32 = 1;

    /// Largest dice count accepted as dice notation
    pub const MAX_DICE: u32 = 1000;
}
