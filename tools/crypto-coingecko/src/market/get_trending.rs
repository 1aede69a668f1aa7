//! # `get_trending`
//!
//! Tool that lists the coins currently trending on CoinGecko.

use {
    crate::{
        coingecko_client::CoinGeckoClient,
        market::{
            models::{TrendingCoin, TrendingItem},
            TRENDING_LIMIT,
        },
        utils::is_empty_payload,
    },
    log::warn,
    schemars::JsonSchema,
    serde::Deserialize,
    serde_json::Value,
    tool_toolkit::*,
};

/// Returned when the trending list could not be obtained.
pub(crate) const TRENDING_UNAVAILABLE: &str = "Unable to fetch trending cryptocurrencies.";
/// Placed between two rendered coins.
pub(crate) const TRENDING_SEPARATOR: &str = "\n---\n";

/// This tool takes no input.
#[derive(Debug, Deserialize, JsonSchema)]
pub(crate) struct Input {}

pub(crate) struct GetTrending {
    client: CoinGeckoClient,
}

impl GetTrending {
    pub(crate) fn new(client: CoinGeckoClient) -> Self {
        Self { client }
    }
}

impl Tool for GetTrending {
    type Input = Input;

    fn name() -> &'static str {
        "get_trending"
    }

    fn description() -> &'static str {
        "Get list of trending cryptocurrencies."
    }

    async fn invoke(&self, _: Self::Input) -> String {
        let data = match self.client.get("search/trending", &[]).await {
            Ok(data) if !is_empty_payload(&data) => data,
            _ => return TRENDING_UNAVAILABLE.to_string(),
        };

        match top_trending(&data) {
            Some(coins) => coins
                .iter()
                .map(|coin| format_trending_item(&coin.item))
                .collect::<Vec<_>>()
                .join(TRENDING_SEPARATOR),
            None => TRENDING_UNAVAILABLE.to_string(),
        }
    }
}

/// Parses the first [`TRENDING_LIMIT`] entries of the `coins` list, keeping
/// their order. Entries past the limit are not looked at.
fn top_trending(data: &Value) -> Option<Vec<TrendingCoin>> {
    let coins = data.get("coins")?.as_array()?;

    coins
        .iter()
        .take(TRENDING_LIMIT)
        .map(|coin| {
            serde_json::from_value::<TrendingCoin>(coin.clone())
                .map_err(|e| warn!("Malformed trending entry {coin}: {e}"))
                .ok()
        })
        .collect()
}

fn format_trending_item(item: &TrendingItem) -> String {
    format!(
        "\n🔥 {name} ({symbol})\nMarket Cap Rank: #{rank}\nPrice BTC: {price:.8} BTC\n",
        name = item.name,
        rank = item.rank_label(),
        symbol = item.symbol.to_uppercase(),
        price = item.price_btc.unwrap_or(0.0),
    )
}
