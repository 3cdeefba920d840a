//! Ticker probe
//!
//! Prints the raw spot and contract ticker results for each symbol given on
//! the command line, e.g. `probe_tickers BTCUSDT PEPEUSDT`. The contract
//! symbol is derived as `<BASE>_USDT`.
//!
//! Uses `SCANNER_CONFIG` (or `config.yaml`) for endpoints when present,
//! built-in defaults otherwise.

use std::path::PathBuf;

use spread_scanner::adapters::mexc::{MexcContractMarket, MexcSpotMarket};
use spread_scanner::adapters::{DerivativeMarket, SpotMarket};
use spread_scanner::config::{self, AppConfig};
use spread_scanner::core::{normalize, SymbolKind};

const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::logging::init_logging();

    let path = std::env::var("SCANNER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yaml"));
    let config = if path.exists() {
        config::load_config(&path)?
    } else {
        AppConfig::default()
    };

    let mut symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols = DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect();
    }

    let spot = MexcSpotMarket::new(&config.spot_api, &config.ranking);
    let contract = MexcContractMarket::new(&config.derivative_api);

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       MEXC TICKER PROBE                                  ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("   spot:     {}", config.spot_api.base_url);
    println!("   contract: {}", config.derivative_api.base_url);

    for symbol in symbols {
        let spot_symbol = symbol.to_ascii_uppercase();
        let contract_symbol = format!("{}_USDT", normalize(&spot_symbol, SymbolKind::Spot));

        println!("\n📊 {} / {}", spot_symbol, contract_symbol);

        match spot.ticker(&spot_symbol).await {
            Ok(quote) => println!("   ✅ spot     price={} volume={}", quote.price, quote.volume),
            Err(e) => println!("   ❌ spot     {}", e),
        }

        match contract.ticker(&contract_symbol).await {
            Ok(price) => println!("   ✅ contract price={}", price),
            Err(e) => println!("   ❌ contract {} (retryable: {})", e, e.is_retryable()),
        }
    }

    Ok(())
}
