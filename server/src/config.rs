//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// CSV file with the raw personal data
    pub data_path: PathBuf,

    /// Schema policy JSON file
    pub schema_path: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            data_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/people.csv")),

            schema_path: env::var("SCHEMA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config/schema.json")),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Startup auto-fit is skipped in CI
    pub fn auto_fit_enabled(&self) -> bool {
        env::var("CI").map(|v| v != "true").unwrap_or(true)
    }
}
