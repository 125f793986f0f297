use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use basin_invoke_encoder::{parse_felt, StarkSigner};
use clap::Parser;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::info;

mod config;
mod gateway;
mod workflow;

use config::{load_json, AccountInfo, DeploymentInfo, Ratio, TokenEntry};
use gateway::StarknetCliGateway;
use workflow::{BootstrapPlan, ConfirmPolicy, PoolBootstrap, PoolRecord, TokenSpec};

/// Create a basin pool and register its approved tokens, one signed
/// invocation per step, then write the resulting pool record.
///
/// Contract addresses come from the state files the deployment harness left
/// behind; the signing key and network come from the environment (a `.env`
/// file is honored).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Signing key for the account, as a decimal or 0x-hex felt.
    #[arg(long, env = "PRIV_KEY", hide_env_values = true)]
    private_key: String,

    /// Network name passed through to the `starknet` CLI.
    #[arg(long, env = "STARKNET_NETWORK", default_value = "alpha-goerli")]
    network: String,

    /// Account state file (`{ "address": "0x..." }`).
    #[arg(long, default_value = "state/account.json")]
    account_path: PathBuf,

    /// Deployment state file (router / pool / lp_token addresses).
    #[arg(long, default_value = "state/deployment.json")]
    deployment_path: PathBuf,

    /// Token list: addresses plus weight ratios.
    #[arg(long, default_value = "state/tokens.json")]
    tokens_path: PathBuf,

    /// Directory holding the per-contract ABI JSON files.
    #[arg(long, default_value = "interfaces")]
    interfaces_dir: PathBuf,

    /// Pool swap fee, as `numerator/denominator`.
    #[arg(long, default_value = "1/1000")]
    swap_fee: Ratio,

    /// Pool exit fee, as `numerator/denominator`.
    #[arg(long, default_value = "1/1000")]
    exit_fee: Ratio,

    /// Query each transaction's status after submission and fail the step if
    /// the network reports it rejected.
    #[arg(long)]
    confirm: bool,

    /// Where to write the pool record on success.
    #[arg(long, default_value = "state/pools.json")]
    output_path: PathBuf,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let account: AccountInfo = load_json(&cli.account_path)?;
    let deployment: DeploymentInfo = load_json(&cli.deployment_path)?;
    let token_entries: Vec<TokenEntry> = load_json(&cli.tokens_path)?;

    let signer = StarkSigner::new(parse_felt(&cli.private_key).context("bad PRIV_KEY")?)
        .context("unusable signing key")?;

    let mut tokens = Vec::with_capacity(token_entries.len());
    for entry in &token_entries {
        anyhow::ensure!(
            entry.weight.denominator != 0,
            "token {} has a zero weight denominator",
            entry.address
        );
        tokens.push(TokenSpec {
            address: parse_felt(&entry.address)
                .with_context(|| format!("bad token address {}", entry.address))?,
            weight: entry.weight,
        });
    }

    let plan = BootstrapPlan {
        account: parse_felt(&account.address).context("bad account address")?,
        router: parse_felt(&deployment.router.address).context("bad router address")?,
        pool: parse_felt(&deployment.pool.address).context("bad pool address")?,
        lp_token: parse_felt(&deployment.lp_token.address).context("bad lp_token address")?,
        swap_fee: cli.swap_fee,
        exit_fee: cli.exit_fee,
        tokens,
    };
    let confirm = if cli.confirm {
        ConfirmPolicy::CheckStatus
    } else {
        ConfirmPolicy::Skip
    };

    info!(
        network = %cli.network,
        pool = %format!("{:#x}", plan.pool),
        tokens = plan.tokens.len(),
        "starting pool bootstrap"
    );

    let gateway = StarknetCliGateway::new(&cli.network, &cli.interfaces_dir)
        .context("failed building acknowledgment patterns")?;
    let mut bootstrap = PoolBootstrap::new(&gateway, &signer, plan, confirm);
    let record = bootstrap.run()?;

    write_pool_record(&cli.output_path, &cli.network, &record)?;
    println!(
        "Created pool {} with {} approved token(s)",
        record.pool,
        record.tokens.len()
    );
    Ok(())
}

fn write_pool_record(path: &Path, network: &str, record: &PoolRecord) -> Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let mut root = json!({
        "network": network,
        "updated_at": now,
    });
    root["pool"] = serde_json::to_value(record).context("failed serialising pool record")?;

    write_json_atomic(path, &root)
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising pool record JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
