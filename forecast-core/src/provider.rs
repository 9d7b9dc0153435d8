use crate::{Config, model::ForecastReply, provider::openweather::OpenWeatherSource};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Failures below the application layer: the request never produced a usable body.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to forecast service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("forecast response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can fetch a multi-day forecast for a city name.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Result<ForecastReply, FetchError>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastSource>> {
    let api_key = config.resolve_api_key()?;
    let source = OpenWeatherSource::new(api_key, config.endpoint(), config.request_timeout())?;

    Ok(Arc::new(source))
}
