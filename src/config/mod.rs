/// Database configuration and connection management
pub mod database;

/// Club configuration loading from club.toml and reference data seeding
pub mod club;

/// Operator nickname configuration from environment variables
pub mod operators;
