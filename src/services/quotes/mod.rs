//! HTTP clients for the upstream quote sources.

mod parse;

pub mod alphavantage;
pub mod coingecko;
pub mod tradingview;

pub use alphavantage::AlphaVantageClient;
pub use coingecko::CoinGeckoClient;
pub use tradingview::TradingViewClient;

use crate::error::MarketDataError;

pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<url::Url, MarketDataError> {
    Ok(url::Url::parse(&format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))?)
}

pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: url::Url,
) -> Result<serde_json::Value, MarketDataError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::Status(status.as_u16()));
    }
    Ok(response.json().await?)
}
