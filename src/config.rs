use std::env;

use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    /// Directory holding the employee and leave tables.
    pub data_dir: String,
    /// Directory for the rolling log file.
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}
