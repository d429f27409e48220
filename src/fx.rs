// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exchange-rate lookups.
//!
//! [`RateSource`] is the seam between the ledger and the network. The
//! production source talks to ExchangeRate-API v6:
//! `GET {base_url}/{api_key}/latest/{base}` returning
//! `{"result": "success"|"error", "conversion_rates": {..}, "error-type": ..}`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{LedgerError, LedgerResult};
use crate::utils::http_client;

/// Latest rates quoted against `base`: 1 `base` = `rate` quote.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: String,
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    pub fn new(base: impl Into<String>, rates: HashMap<String, Decimal>) -> Self {
        Self {
            base: base.into(),
            rates,
        }
    }

    pub fn rate(&self, quote: &str) -> Option<Decimal> {
        if quote == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(quote).copied()
    }

    /// Decode an API response body. `status_ok` is false when the HTTP status
    /// was not 2xx; the body may still carry an `error-type`.
    pub fn from_response_body(base: &str, body: &str, status_ok: bool) -> LedgerResult<Self> {
        let parsed: LatestResponse = match serde_json::from_str(body) {
            Ok(p) => p,
            Err(e) if status_ok => {
                return Err(LedgerError::ExternalService(format!(
                    "malformed rate payload: {}",
                    e
                )));
            }
            Err(_) => LatestResponse::default(),
        };

        if !status_ok || parsed.result.as_deref() == Some("error") {
            let kind = parsed
                .error_type
                .unwrap_or_else(|| "request failed".to_string());
            return Err(LedgerError::ExternalService(kind));
        }

        let raw = parsed.conversion_rates.ok_or_else(|| {
            LedgerError::ExternalService("response has no conversion_rates".into())
        })?;
        let mut rates = HashMap::with_capacity(raw.len());
        for (quote, value) in raw {
            let rate = Decimal::try_from(value).map_err(|_| {
                LedgerError::ExternalService(format!("invalid rate '{}' for {}", value, quote))
            })?;
            rates.insert(quote, rate);
        }
        Ok(Self::new(base, rates))
    }
}

#[derive(Debug, Default, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    conversion_rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

pub trait RateSource {
    fn latest(&self, api_key: &str, base: &str) -> LedgerResult<RateTable>;
}

pub struct ExchangeRateApi {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ExchangeRateApi {
    pub fn new(base_url: impl Into<String>) -> LedgerResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }
}

impl RateSource for ExchangeRateApi {
    fn latest(&self, api_key: &str, base: &str) -> LedgerResult<RateTable> {
        let url = format!("{}/{}/latest/{}", self.base_url, api_key, base);
        tracing::debug!(base, "fetching latest exchange rates");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        let body = resp.text()?;
        let table = RateTable::from_response_body(base, &body, status.is_success());
        if let Err(ref e) = table {
            tracing::warn!(base, status = status.as_u16(), error = %e, "exchange-rate request failed");
        }
        table
    }
}

/// Outcome of checking an API key against the rate service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyCheck {
    pub valid: bool,
    pub error: Option<String>,
}

pub fn verify_api_key(source: &dyn RateSource, api_key: &str) -> ApiKeyCheck {
    match source.latest(api_key, "USD") {
        Ok(_) => ApiKeyCheck {
            valid: true,
            error: None,
        },
        Err(LedgerError::ExternalService(kind)) => ApiKeyCheck {
            valid: false,
            error: Some(kind),
        },
        Err(e) => ApiKeyCheck {
            valid: false,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_payload() {
        let body = r#"{"result":"success","base_code":"USD","conversion_rates":{"USD":1,"EUR":0.5,"INR":83}}"#;
        let table = RateTable::from_response_body("USD", body, true).unwrap();
        assert_eq!(table.rate("EUR"), Some(Decimal::new(5, 1)));
        assert_eq!(table.rate("INR"), Some(Decimal::from(83)));
        assert_eq!(table.rate("GBP"), None);
    }

    #[test]
    fn error_payload_surfaces_error_type() {
        let body = r#"{"result":"error","error-type":"invalid-key"}"#;
        let err = RateTable::from_response_body("USD", body, true).unwrap_err();
        assert_eq!(err.to_string(), "Exchange-rate service error: invalid-key");
    }

    #[test]
    fn http_failure_without_json_body() {
        let err = RateTable::from_response_body("USD", "<html>502</html>", false).unwrap_err();
        assert!(matches!(err, LedgerError::ExternalService(_)));
    }
}
