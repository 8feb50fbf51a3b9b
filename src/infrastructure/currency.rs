//! Exchange-rate lookups against an open.er-api.com compatible service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("Exchange rate request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Exchange rate service answered {0}")]
    Status(u16),

    #[error("Invalid currency code: {0}")]
    UnknownCurrency(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExchangeRates {
    pub base: String,
    pub rates: HashMap<String, f64>,
    #[schema(value_type = String, example = "2024-06-01T00:00:00Z")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RatesResponse {
    base_code: String,
    time_last_update_unix: i64,
    rates: HashMap<String, f64>,
}

#[derive(Clone)]
pub struct CurrencyClient {
    http: reqwest::Client,
    base_url: String,
}

impl CurrencyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CurrencyError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(CurrencyClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// One GET per call; no caching.
    pub async fn exchange_rates(&self, base_currency: &str) -> Result<ExchangeRates, CurrencyError> {
        let url = format!("{}/{}", self.base_url, base_currency);
        let response = self.http.get(&url).send().await.inspect_err(|e| {
            error!(error = %e, %url, "failed to fetch exchange rates");
        })?;
        if !response.status().is_success() {
            error!(status = %response.status(), %url, "failed to fetch exchange rates");
            return Err(CurrencyError::Status(response.status().as_u16()));
        }
        let body: RatesResponse = response.json().await?;
        Ok(ExchangeRates {
            base: body.base_code,
            rates: body.rates,
            last_updated: DateTime::from_timestamp(body.time_last_update_unix, 0).unwrap_or_else(Utc::now),
        })
    }
}

/// Converts through the table's base currency.
pub fn convert_amount(
    amount: f64,
    from_currency: &str,
    to_currency: &str,
    rates: &HashMap<String, f64>,
) -> Result<f64, CurrencyError> {
    if from_currency == to_currency {
        return Ok(amount);
    }
    let from = rate(rates, from_currency)?;
    let to = rate(rates, to_currency)?;
    Ok(amount / from * to)
}

fn rate(rates: &HashMap<String, f64>, code: &str) -> Result<f64, CurrencyError> {
    match rates.get(code) {
        Some(rate) if *rate > 0.0 && rate.is_finite() => Ok(*rate),
        _ => Err(CurrencyError::UnknownCurrency(code.to_string())),
    }
}
