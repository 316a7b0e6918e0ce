use std::process;

use clap::Parser;
use tracing::{error, info};
use zero_x_models::log::init_tracing;
use zero_x_playground::config::{Cli, Config, Mode};
use zero_x_playground::error::{PlaygroundResult, ReportDisplayExt as _};
use zero_x_playground::evm::chain::RpcChainClient;
use zero_x_playground::evm::filler::fill_quote;
use zero_x_playground::routers::zero_x::zero_x::ZeroXClient;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(report) = run(cli).await {
        error!(details = %report.format(), "{}", report.current_context());
        error!("{report:?}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> PlaygroundResult<()> {
    // Fails on bad flags before any network call
    let config = Config::try_from(cli)?;

    let zero_x = ZeroXClient::new(&config.zero_x_url, config.timeout)?;
    info!(base = %zero_x.base(), request = ?config.quote_request, "Requesting quote");

    let quote = zero_x.quote(&config.quote_request).await?;

    match &config.mode {
        Mode::QuoteOnly => println!("{quote}"),
        Mode::Fill {
            signer,
            ethereum_url,
        } => {
            let chain = RpcChainClient::new(ethereum_url.clone(), config.timeout);
            let tx_hash = fill_quote(&chain, signer, &quote).await?;
            println!("fill sent; transaction hash: {tx_hash}");
        }
    }

    Ok(())
}
