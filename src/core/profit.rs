//! Lump-sum profit between two NAV dates

use crate::core::diagnostics::Diagnostics;
use crate::core::nav::{NavError, NavProvider};
use chrono::NaiveDate;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CAPITAL: f64 = 1_000_000.0;

const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Which of the two NAV lookups a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Start,
    End,
}

impl Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Leg::Start => "start",
                Leg::End => "end",
            }
        )
    }
}

/// Coarse classification of every way a calculation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    NotFound,
    Parse,
    Arithmetic,
}

#[derive(Debug, Error)]
pub enum ProfitError {
    #[error("Invalid {leg} date '{value}': {source}")]
    InvalidDate {
        leg: Leg,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Failed to fetch {leg} NAV for {date}: {source}")]
    Nav {
        leg: Leg,
        date: NaiveDate,
        #[source]
        source: NavError,
    },

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
}

impl NavError {
    pub fn kind(&self) -> FailureKind {
        match self {
            NavError::Network { .. } => FailureKind::Network,
            NavError::NotFound { .. } => FailureKind::NotFound,
            NavError::Parse { .. } => FailureKind::Parse,
        }
    }
}

impl ProfitError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProfitError::InvalidDate { .. } => FailureKind::Parse,
            ProfitError::Nav { source, .. } => source.kind(),
            ProfitError::Arithmetic(_) => FailureKind::Arithmetic,
        }
    }
}

/// Profit on `capital` invested at `nav_start` and redeemed at `nav_end`.
pub fn unit_profit(capital: f64, nav_start: f64, nav_end: f64) -> Result<f64, ProfitError> {
    if nav_start == 0.0 {
        return Err(ProfitError::Arithmetic(
            "start NAV is zero, cannot allot units".to_string(),
        ));
    }

    let units = capital / nav_start;
    let value_end = units * nav_end;
    let profit = value_end - capital;

    if !profit.is_finite() {
        return Err(ProfitError::Arithmetic(format!(
            "non-finite profit for capital {capital}, NAV {nav_start} -> {nav_end}"
        )));
    }
    Ok(profit)
}

fn parse_input_date(leg: Leg, value: &str) -> Result<NaiveDate, ProfitError> {
    NaiveDate::parse_from_str(value, INPUT_DATE_FORMAT).map_err(|source| {
        ProfitError::InvalidDate {
            leg,
            value: value.to_string(),
            source,
        }
    })
}

#[derive(Clone)]
pub struct ProfitCalculator {
    provider: Arc<dyn NavProvider>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ProfitCalculator {
    pub fn new(provider: Arc<dyn NavProvider>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            provider,
            diagnostics,
        }
    }

    /// Computes the profit of investing `capital` in `scheme_code` on
    /// `start_date` and redeeming on `end_date`. Dates are `YYYY-MM-DD`.
    ///
    /// Every failure is reported to the diagnostics sink before it is returned.
    pub async fn calculate_profit(
        &self,
        scheme_code: &str,
        start_date: &str,
        end_date: &str,
        capital: f64,
    ) -> Result<f64, ProfitError> {
        let result = self
            .compute(scheme_code, start_date, end_date, capital)
            .await;
        if let Err(e) = &result {
            self.diagnostics.report(scheme_code, e);
        }
        result
    }

    async fn compute(
        &self,
        scheme_code: &str,
        start_date: &str,
        end_date: &str,
        capital: f64,
    ) -> Result<f64, ProfitError> {
        let start = parse_input_date(Leg::Start, start_date)?;
        let end = parse_input_date(Leg::End, end_date)?;

        // Both legs are always looked up; the start failure wins when both fail.
        let nav_start = self.fetch(scheme_code, Leg::Start, start).await;
        let nav_end = self.fetch(scheme_code, Leg::End, end).await;
        let (nav_start, nav_end) = (nav_start?, nav_end?);
        debug!(scheme_code, %start, nav_start, %end, nav_end, capital, "Computing profit");

        unit_profit(capital, nav_start, nav_end)
    }

    async fn fetch(&self, scheme_code: &str, leg: Leg, date: NaiveDate) -> Result<f64, ProfitError> {
        self.provider
            .fetch_nav(scheme_code, date)
            .await
            .map_err(|source| ProfitError::Nav { leg, date, source })
    }
}
