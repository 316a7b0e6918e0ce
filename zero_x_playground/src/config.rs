use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use error_stack::{Report, report};
use reqwest::Url;

use crate::{
    error::{Error, PlaygroundResult},
    routers::zero_x::{DEFAULT_ZERO_X_API_URL, requests::ZeroXQuoteRequest},
    utils::number_conversion::parse_u256,
};

pub const DEFAULT_ETHEREUM_RPC_URL: &str = "https://kovan.infura.io/";

/// Fetch a 0x swap quote and fill it from a testnet account.
#[derive(Parser, Debug, Clone)]
#[command(name = "quote_filler", version)]
pub struct Cli {
    /// Base 0x API URL
    #[arg(long = "raw-url", env = "ZERO_X_API_URL", default_value = DEFAULT_ZERO_X_API_URL)]
    pub raw_url: String,

    /// Ethereum JSON-RPC URL (testnet only)
    #[arg(long, env = "ETHEREUM_RPC_URL", default_value = DEFAULT_ETHEREUM_RPC_URL)]
    pub ethereum_url: String,

    /// Ticker or address of the sell token
    #[arg(long, default_value = "WETH")]
    pub sell_token: String,

    /// Ticker or address of the buy token
    #[arg(long, default_value = "DAI")]
    pub buy_token: String,

    /// Size of the trade in base units of the sell token
    #[arg(long)]
    pub sell_token_size: Option<String>,

    /// Size of the trade in base units of the buy token
    #[arg(long)]
    pub buy_token_size: Option<String>,

    /// Un-prefixed hex-encoded account private key
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Print the quote instead of filling it
    #[arg(long)]
    pub quote_only: bool,

    /// Deadline for each HTTP and RPC call
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Emit logs as flattened JSON
    #[arg(long)]
    pub json_logs: bool,
}

/// What to do with the quote once it is fetched.
#[derive(Debug)]
pub enum Mode {
    QuoteOnly,
    Fill {
        signer: PrivateKeySigner,
        ethereum_url: Url,
    },
}

/// Validated run configuration. Building it performs no I/O.
#[derive(Debug)]
pub struct Config {
    pub zero_x_url: String,
    pub quote_request: ZeroXQuoteRequest,
    pub mode: Mode,
    pub timeout: Duration,
}

fn usage_error(message: impl Into<String>) -> Report<Error> {
    report!(Error::UsageError(message.into()))
}

// Empty flags count as unset
fn parse_size(flag: &str, raw: Option<&str>) -> PlaygroundResult<Option<U256>> {
    match raw.filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_u256(flag, raw).map(Some).map_err(|e| {
            e.change_context(Error::UsageError(format!("invalid --{flag}: {raw}")))
        }),
        None => Ok(None),
    }
}

impl TryFrom<Cli> for Config {
    type Error = Report<Error>;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mode = if cli.quote_only {
            Mode::QuoteOnly
        } else {
            let private_key = cli
                .private_key
                .as_deref()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    usage_error("must set private key (testnet) to use test order filler")
                })?;

            let signer = PrivateKeySigner::from_str(private_key)
                .map_err(|_| usage_error("private key is not a valid secp256k1 key"))?;

            let ethereum_url = Url::parse(&cli.ethereum_url).map_err(|e| {
                usage_error(format!("invalid --ethereum-url {}: {e}", cli.ethereum_url))
            })?;

            Mode::Fill {
                signer,
                ethereum_url,
            }
        };

        let sell_amount = parse_size("sell-token-size", cli.sell_token_size.as_deref())?;
        let buy_amount = parse_size("buy-token-size", cli.buy_token_size.as_deref())?;

        match (sell_amount, buy_amount) {
            (None, None) => {
                return Err(usage_error(
                    "one of either buy size or sell size must be specified",
                ));
            }
            (Some(_), Some(_)) => {
                return Err(usage_error(
                    "must not specify both sell size and buy size; set only one",
                ));
            }
            _ => {}
        }

        Ok(Self {
            zero_x_url: cli.raw_url,
            quote_request: ZeroXQuoteRequest {
                sell_token: cli.sell_token,
                buy_token: cli.buy_token,
                sell_amount,
                buy_amount,
            },
            mode,
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}
