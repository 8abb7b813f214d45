//! TradingView market-data proxy.
//!
//! `GET {base}/market-data?symbol=..&interval=..&exchange=..` answers with
//! either a flat `{price}`, a wrapped `{result: {price}}`, or candle arrays
//! `{c: [..], h: [..], l: [..], v: [..]}`.

use serde_json::Value;

use super::parse::{last_of, number, optional_number};
use super::{endpoint, get_json};
use crate::error::MarketDataError;
use crate::models::MarketDataHints;
use crate::services::market_data::Quote;

pub struct TradingViewClient {
    client: reqwest::Client,
    base_url: String,
}

impl TradingViewClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn fetch_quote(
        &self,
        symbol: &str,
        hints: &MarketDataHints,
    ) -> Result<Quote, MarketDataError> {
        let mut url = endpoint(&self.base_url, "market-data")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("symbol", symbol);
            if let Some(interval) = &hints.interval {
                query.append_pair("interval", interval);
            }
            if let Some(exchange) = &hints.exchange {
                query.append_pair("exchange", exchange);
            }
        }

        let body = get_json(&self.client, url).await?;
        parse_quote(&body)
    }
}

fn parse_quote(body: &Value) -> Result<Quote, MarketDataError> {
    let payload = match body.get("result") {
        Some(result) if result.is_object() => result,
        _ => body,
    };

    let price = match (body.get("price"), payload.get("price")) {
        (Some(price), _) if !price.is_null() => number("price", price)?,
        (_, Some(price)) if !price.is_null() => number("result.price", price)?,
        _ => last_of("c", payload.get("c"))?.ok_or(MarketDataError::MissingField("price"))?,
    };

    let high = match last_of("h", payload.get("h"))? {
        Some(high) => Some(high),
        None => optional_number("high", payload.get("high"))?,
    };
    let low = match last_of("l", payload.get("l"))? {
        Some(low) => Some(low),
        None => optional_number("low", payload.get("low"))?,
    };
    let volume = match last_of("v", payload.get("v"))? {
        Some(volume) => Some(volume),
        None => optional_number("volume", payload.get("volume"))?,
    };

    Ok(Quote {
        price,
        high,
        low,
        volume,
    })
}
