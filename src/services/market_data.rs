//! Market data provider interface.
//!
//! The engine only ever asks one question: what is the latest observation
//! for this target? Unavailability is a normal answer (`None`), never an
//! error, so one flaky upstream cannot abort a scheduler pass.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::MarketDataConfig;
use crate::models::{MarketDataHints, Target};
use crate::services::quotes::{AlphaVantageClient, CoinGeckoClient, TradingViewClient};

/// One market observation. Range and volume are optional; sources that only
/// quote a last price leave them empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl Quote {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            high: None,
            low: None,
            volume: None,
        }
    }

    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the latest observation for a target, `None` when unavailable
    async fn get_quote(&self, target: &Target, hints: &MarketDataHints) -> Option<Quote>;
}

/// Live gateway: TradingView proxy first for stocks with Alpha Vantage as
/// fallback, CoinGecko for crypto pairs.
pub struct MarketDataGateway {
    tradingview: TradingViewClient,
    alphavantage: Option<AlphaVantageClient>,
    coingecko: CoinGeckoClient,
}

impl MarketDataGateway {
    pub fn new(
        tradingview: TradingViewClient,
        alphavantage: Option<AlphaVantageClient>,
        coingecko: CoinGeckoClient,
    ) -> Self {
        Self {
            tradingview,
            alphavantage,
            coingecko,
        }
    }

    /// Build all clients from configuration, sharing one HTTP client.
    /// Alpha Vantage is only enabled when an API key is configured.
    pub fn from_config(config: &MarketDataConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let alphavantage = config.alphavantage_api_key.as_ref().map(|key| {
            AlphaVantageClient::with_client(&config.alphavantage_base_url, key, client.clone())
        });

        Ok(Self::new(
            TradingViewClient::with_client(&config.tradingview_base_url, client.clone()),
            alphavantage,
            CoinGeckoClient::with_client(&config.coingecko_base_url, client),
        ))
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataGateway {
    async fn get_quote(&self, target: &Target, hints: &MarketDataHints) -> Option<Quote> {
        match target {
            Target::Stock { symbol } => {
                match self.tradingview.fetch_quote(symbol, hints).await {
                    Ok(quote) => return Some(quote),
                    Err(e) => warn!(symbol = %symbol, error = %e, "TradingView quote failed"),
                }

                let alphavantage = match &self.alphavantage {
                    Some(client) => client,
                    None => {
                        debug!(symbol = %symbol, "No fallback quote source configured");
                        return None;
                    }
                };
                match alphavantage.fetch_quote(symbol).await {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "Alpha Vantage quote failed");
                        None
                    }
                }
            }
            Target::Crypto { id, vs } => match self.coingecko.fetch_quote(id, vs).await {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!(id = %id, vs = %vs, error = %e, "CoinGecko quote failed");
                    None
                }
            },
        }
    }
}

/// In-memory provider with settable quotes, for tests and offline runs.
#[derive(Default)]
pub struct StaticMarketDataProvider {
    quotes: RwLock<HashMap<Target, Quote>>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, target: Target, price: f64) {
        self.set_quote(target, Quote::new(price)).await;
    }

    pub async fn set_quote(&self, target: Target, quote: Quote) {
        self.quotes.write().await.insert(target, quote);
    }

    /// Make the target unavailable.
    pub async fn remove(&self, target: &Target) {
        self.quotes.write().await.remove(target);
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_quote(&self, target: &Target, _hints: &MarketDataHints) -> Option<Quote> {
        self.quotes.read().await.get(target).copied()
    }
}
