//! NAV lookup abstractions and core types

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("NAV request for scheme {scheme_code} failed: {source}")]
    Network {
        scheme_code: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("No NAV for scheme {scheme_code} on {date}")]
    NotFound { scheme_code: String, date: NaiveDate },

    #[error("Malformed NAV response for scheme {scheme_code}: {reason}")]
    Parse { scheme_code: String, reason: String },
}

#[async_trait]
pub trait NavProvider: Send + Sync {
    /// Returns the NAV published for `scheme_code` on exactly `date`.
    async fn fetch_nav(&self, scheme_code: &str, date: NaiveDate) -> Result<f64, NavError>;
}
