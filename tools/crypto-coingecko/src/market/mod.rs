//! Market data endpoints for CoinGecko API

use {
    strum::IntoEnumIterator,
    strum_macros::{AsRefStr, Display, EnumIter, EnumString},
};

pub(crate) const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
/// How many entries of the trending list are rendered.
pub(crate) const TRENDING_LIMIT: usize = 7;

pub(crate) mod get_price;
pub(crate) mod get_trending;
pub(crate) mod models;

/// Currencies prices can be quoted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    /// Comma separated list of the supported currency codes.
    pub(crate) fn supported() -> String {
        Currency::iter()
            .map(|currency| currency.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, std::str::FromStr};

    #[test]
    fn test_supported_list() {
        assert_eq!(Currency::supported(), "usd, eur, gbp, jpy");
    }

    #[rstest]
    #[case("usd", Currency::Usd)]
    #[case("eur", Currency::Eur)]
    #[case("gbp", Currency::Gbp)]
    #[case("jpy", Currency::Jpy)]
    fn test_parse_lowercase_codes(#[case] code: &str, #[case] expected: Currency) {
        assert_eq!(Currency::from_str(code), Ok(expected));
        assert_eq!(expected.as_ref(), code);
    }

    #[rstest]
    #[case("USD")]
    #[case("btc")]
    #[case("")]
    #[case("us d")]
    fn test_reject_other_codes(#[case] code: &str) {
        assert!(Currency::from_str(code).is_err());
    }
}
