//! Data models for CoinGecko market endpoints

use {
    super::Currency,
    serde::Deserialize,
    serde_json::{Map, Value},
};

/// Price figures of one coin from `/simple/price`, all in the requested
/// currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceData {
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
}

impl PriceData {
    /// Reads `<ccy>`, `<ccy>_24h_change` and `<ccy>_market_cap` from a coin
    /// entry. Absent or non-numeric fields read as zero.
    pub fn from_entry(entry: &Map<String, Value>, currency: Currency) -> Self {
        let field = |key: String| entry.get(&key).and_then(Value::as_f64).unwrap_or(0.0);

        Self {
            price: field(currency.to_string()),
            change_24h: field(format!("{currency}_24h_change")),
            market_cap: field(format!("{currency}_market_cap")),
        }
    }
}

/// One element of the `coins` list of `/search/trending`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingCoin {
    pub item: TrendingItem,
}

/// Trending coin details
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingItem {
    pub name: String,
    pub symbol: String,
    /// Kept as sent, CoinGecko does not always send an integer.
    #[serde(default)]
    pub market_cap_rank: Option<Value>,
    #[serde(default)]
    pub price_btc: Option<f64>,
}

impl TrendingItem {
    /// Market cap rank as text, `N/A` when absent or `null`.
    pub fn rank_label(&self) -> String {
        match &self.market_cap_rank {
            None => "N/A".to_string(),
            Some(Value::String(rank)) => rank.clone(),
            Some(rank) => rank.to_string(),
        }
    }
}
