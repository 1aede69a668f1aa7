//! # `get_price`
//!
//! Tool that retrieves the current price, 24h change and market cap of a
//! cryptocurrency from CoinGecko and renders them as text.

use {
    crate::{
        coingecko_client::CoinGeckoClient,
        market::{models::PriceData, Currency},
        utils::{format_thousands, is_empty_payload},
    },
    schemars::JsonSchema,
    serde::Deserialize,
    serde_json::Value,
    tool_toolkit::*,
};

/// Returned when CoinGecko could not be reached or answered with nothing.
pub(crate) const PRICE_UNAVAILABLE: &str =
    "Unable to fetch cryptocurrency data. Please try again later.";

fn default_currency() -> String {
    Currency::Usd.to_string()
}

fn unsupported_currency() -> String {
    format!(
        "Unsupported currency. Please use one of: {}",
        Currency::supported()
    )
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(crate) struct Input {
    /// Cryptocurrency ID (e.g., bitcoin, ethereum, dogecoin)
    coin_id: String,
    /// Currency for price (default: usd)
    #[serde(default = "default_currency")]
    currency: String,
}

pub(crate) struct GetPrice {
    client: CoinGeckoClient,
}

impl GetPrice {
    pub(crate) fn new(client: CoinGeckoClient) -> Self {
        Self { client }
    }
}

impl Tool for GetPrice {
    type Input = Input;

    fn name() -> &'static str {
        "get_price"
    }

    fn description() -> &'static str {
        "Get current price and details for a cryptocurrency."
    }

    async fn invoke(&self, Self::Input { coin_id, currency }: Self::Input) -> String {
        // Reject unknown currencies before touching the network.
        let Ok(currency) = currency.to_lowercase().parse::<Currency>() else {
            return unsupported_currency();
        };

        let coin_id = coin_id.to_lowercase();

        let query = [
            ("ids", coin_id.as_str()),
            ("vs_currencies", currency.as_ref()),
            ("include_24hr_change", "true"),
            ("include_market_cap", "true"),
        ];

        match self.client.get("simple/price", &query).await {
            Ok(data) if !is_empty_payload(&data) => format_price_data(&data, &coin_id, currency),
            // Failures are already logged by the client.
            _ => PRICE_UNAVAILABLE.to_string(),
        }
    }
}

/// Renders the entry of `coin_id` in a `/simple/price` response.
fn format_price_data(data: &Value, coin_id: &str, currency: Currency) -> String {
    let entry = match data.get(coin_id).and_then(Value::as_object) {
        Some(entry) if !entry.is_empty() => entry,
        _ => return format!("No data available for {coin_id}"),
    };

    let PriceData {
        price,
        change_24h,
        market_cap,
    } = PriceData::from_entry(entry, currency);

    let code = currency.as_ref().to_uppercase();

    format!(
        "\n💰 {coin} Price Data:\nPrice: {code} {price}\n24h Change: {change}%\nMarket Cap: {code} {market_cap}\n",
        coin = coin_id.to_uppercase(),
        price = format_thousands(price, 2),
        change = format_thousands(change_24h, 2),
        market_cap = format_thousands(market_cap, 0),
    )
}
