//! CoinGecko `simple/price` for crypto pairs.

use super::parse::number;
use super::{endpoint, get_json};
use crate::error::MarketDataError;
use crate::services::market_data::Quote;

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn fetch_quote(&self, id: &str, vs: &str) -> Result<Quote, MarketDataError> {
        let mut url = endpoint(&self.base_url, "simple/price")?;
        url.query_pairs_mut()
            .append_pair("ids", id)
            .append_pair("vs_currencies", vs);

        let body = get_json(&self.client, url).await?;
        let price = body
            .get(id)
            .and_then(|asset| asset.get(vs))
            .ok_or(MarketDataError::MissingField("price"))?;

        Ok(Quote::new(number("price", price)?))
    }
}
