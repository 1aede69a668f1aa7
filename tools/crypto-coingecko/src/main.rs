#![doc = include_str!("../README.md")]

use {
    clap::Parser,
    coingecko_client::{CoinGeckoClient, DEFAULT_TIMEOUT_SECS},
    market::{get_price::GetPrice, get_trending::GetTrending, COINGECKO_API_BASE},
    std::time::Duration,
    tool_toolkit::bootstrap,
};

mod coingecko_client;
mod error;
mod market;
#[cfg(test)]
mod test_utils;
mod utils;

/// Name announced to the caller in `initialize`.
const SERVER_NAME: &str = "crypto";

#[derive(Parser)]
#[command(version, about = "CoinGecko price and trending tools over stdio")]
struct Cli {
    /// Base URL of the CoinGecko API
    #[arg(long, value_name = "URL", default_value = COINGECKO_API_BASE)]
    api_base: String,
    /// Timeout of a single upstream request, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Stdout carries protocol frames, env_logger writes to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Customize parsing error handling.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // These 2 are "not real errors" that are used to stop the execution
            // to display the help or version.
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    println!("{}", e);

                    std::process::exit(0);
                }
                _ => (),
            }

            eprintln!("{}", e);

            std::process::exit(1);
        }
    };

    let client = CoinGeckoClient::new(Some(&cli.api_base))
        .with_timeout(Duration::from_secs(cli.timeout_secs));

    let result = bootstrap!(
        SERVER_NAME,
        [GetPrice::new(client.clone()), GetTrending::new(client)]
    );

    if let Err(e) = result {
        log::error!("Server stopped: {e:#}");

        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        clap::CommandFactory,
        mockito::{Matcher, Server},
        serde_json::{json, Value},
        tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        tool_toolkit::{JsonRpcResponse, ToolServer},
    };

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["crypto-coingecko"]).unwrap();

        assert_eq!(cli.api_base, "https://api.coingecko.com/api/v3");
        assert_eq!(cli.timeout_secs, 10);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "crypto-coingecko",
            "--api-base",
            "http://localhost:9000",
            "--timeout-secs",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.api_base, "http://localhost:9000");
        assert_eq!(cli.timeout_secs, 3);
    }

    #[tokio::test]
    async fn test_tools_served_over_json_rpc() {
        let mut server = Server::new_async().await;

        let price = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "bitcoin".into()),
                Matcher::UrlEncoded("vs_currencies".into(), "usd".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "bitcoin": { "usd": 50000, "usd_24h_change": 1.23, "usd_market_cap": 900000000 }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let trending = server
            .mock("GET", "/search/trending")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "coins": [{ "item": { "name": "Pepe", "symbol": "pepe" } }] }).to_string(),
            )
            .create_async()
            .await;

        let client = CoinGeckoClient::new(Some(&server.url()));
        let tools = ToolServer::new(SERVER_NAME, "0.0.0")
            .tool(GetPrice::new(client.clone()))
            .tool(GetTrending::new(client));

        let (caller, transport) = tokio::io::duplex(64 * 1024);
        let (server_reader, server_writer) = tokio::io::split(transport);
        let serving = tokio::spawn(tools.serve(BufReader::new(server_reader), server_writer));
        let (caller_reader, mut caller_writer) = tokio::io::split(caller);

        // No currency: defaults to usd.
        for frame in [
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": "get_price", "arguments": { "coin_id": "bitcoin" } }
            }),
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": { "name": "get_trending" }
            }),
        ] {
            caller_writer
                .write_all(format!("{frame}\n").as_bytes())
                .await
                .unwrap();
        }

        caller_writer.shutdown().await.unwrap();

        let mut lines = BufReader::new(caller_reader).lines();
        let mut texts = Vec::new();

        while let Some(line) = lines.next_line().await.unwrap() {
            let response: JsonRpcResponse = serde_json::from_str(&line).unwrap();
            let result = response.result.unwrap();

            assert_eq!(result["isError"], false);
            assert_eq!(result["content"][0]["type"], "text");

            texts.push((response.id, result["content"][0]["text"].clone()));
        }

        serving.await.unwrap().unwrap();

        texts.sort_by_key(|(id, _)| id.as_u64());

        assert_eq!(
            texts,
            vec![
                (
                    json!(1),
                    Value::from(
                        "\n💰 BITCOIN Price Data:\nPrice: USD 50,000.00\n24h Change: 1.23%\nMarket Cap: USD 900,000,000\n"
                    )
                ),
                (
                    json!(2),
                    Value::from("\n🔥 Pepe (PEPE)\nMarket Cap Rank: #N/A\nPrice BTC: 0.00000000 BTC\n")
                ),
            ]
        );

        price.assert_async().await;
        trending.assert_async().await;
    }
}
