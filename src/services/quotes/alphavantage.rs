//! Alpha Vantage `GLOBAL_QUOTE` fallback for stocks.

use super::parse::{number, optional_number};
use super::{endpoint, get_json};
use crate::error::MarketDataError;
use crate::services::market_data::Quote;

pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_client(base_url, api_key, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, api_key: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let mut url = endpoint(&self.base_url, "query")?;
        url.query_pairs_mut()
            .append_pair("function", "GLOBAL_QUOTE")
            .append_pair("symbol", symbol)
            .append_pair("apikey", &self.api_key);

        let body = get_json(&self.client, url).await?;

        // Rate-limited responses come back 200 with a "Note" and no quote.
        let quote = body
            .get("Global Quote")
            .filter(|q| q.as_object().map_or(false, |o| !o.is_empty()))
            .ok_or(MarketDataError::MissingField("Global Quote"))?;

        let price = number(
            "05. price",
            quote
                .get("05. price")
                .ok_or(MarketDataError::MissingField("05. price"))?,
        )?;

        Ok(Quote {
            price,
            high: optional_number("03. high", quote.get("03. high"))?,
            low: optional_number("04. low", quote.get("04. low"))?,
            volume: optional_number("06. volume", quote.get("06. volume"))?,
        })
    }
}
