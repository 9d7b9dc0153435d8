use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::model::{ForecastEntry, ForecastReply};

use super::{FetchError, ForecastSource};

/// 5-day / 3-hour forecast by city name, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    forecast_url: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String, endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            forecast_url: format!("{}/forecast", endpoint.trim_end_matches('/')),
            http,
        })
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherSource {
    async fn fetch(&self, city: &str) -> Result<ForecastReply, FetchError> {
        debug!(city, url = %self.forecast_url, "requesting forecast");

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body).inspect_err(|_| {
            debug!(%status, body = %truncate_body(&body), "undecodable forecast body");
        })?;

        Ok(parsed.into_reply(status.is_success()))
    }
}

/// `cod` arrives as `"200"` on success but as a bare number on some errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Text(String),
    Number(i64),
}

impl OwCode {
    fn is_success(&self) -> bool {
        match self {
            OwCode::Text(code) => code == "200",
            OwCode::Number(code) => *code == 200,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    cod: Option<OwCode>,
    // A number on success, a human-readable string on failure.
    message: Option<serde_json::Value>,
    list: Option<Vec<OwForecastEntry>>,
    city: Option<OwCity>,
}

impl OwForecastResponse {
    fn into_reply(self, http_ok: bool) -> ForecastReply {
        let accepted = http_ok && self.cod.as_ref().is_some_and(OwCode::is_success);

        if !accepted {
            let message = match self.message {
                Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text),
                _ => None,
            };
            return ForecastReply::Rejected { message };
        }

        let entries = self
            .list
            .unwrap_or_default()
            .into_iter()
            .filter_map(OwForecastEntry::into_entry)
            .collect();

        ForecastReply::Forecast {
            entries,
            timezone_offset: self.city.and_then(|c| c.timezone).unwrap_or(0),
        }
    }
}

impl OwForecastEntry {
    /// `None` for a sample without a timestamp; it cannot be placed in time.
    fn into_entry(self) -> Option<ForecastEntry> {
        let Some(timestamp) = self.dt else {
            debug!("skipping forecast sample without dt");
            return None;
        };

        let first = self.weather.and_then(|w| w.into_iter().next());
        let (condition_code, description) = match first {
            Some(w) => (w.icon, w.description.unwrap_or_default()),
            None => (None, String::new()),
        };

        Some(ForecastEntry {
            timestamp,
            temperature: self.main.and_then(|m| m.temp).unwrap_or(0.0),
            condition_code,
            description,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
