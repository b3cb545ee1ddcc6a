pub mod access_rules;
pub mod auth;
pub mod context;
pub mod entities;
pub mod error;
pub mod repository;

use chrono::Utc;

pub fn default_timestamp() -> i64 {
    Utc::now().timestamp_micros()
}
