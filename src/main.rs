#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Lottery node: deploys the lottery on an in-process development chain and
//! drives it with the keeper, the oracle service and the interval miner.
//! Serves `/metrics` and `/healthz` until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use lottery_harness::core::automation::{spawn_keeper, spawn_miner, Keeper};
use lottery_harness::core::config::{
    install_network_table, network_table, HarnessConfig, NetworkTable, ENV_CONFIG,
};
use lottery_harness::core::oracle::service::{spawn_oracle_service, OracleConfig, OracleService};
use lottery_harness::core::runtime::devnet::{Devnet, DevnetConfig, LOTTERY_NAME};
use lottery_harness::core::state::persistent_state::DeploymentStore;
use lottery_harness::core::types::Address;
use lottery_harness::deploy::{DeployOptions, Deployer};
use lottery_harness::monitoring::{http, logging, metrics::Metrics};
use tracing::{info, warn};

fn account(devnet: &Devnet, index: u32) -> anyhow::Result<Address> {
    devnet
        .accounts()
        .get(index as usize)
        .copied()
        .ok_or_else(|| anyhow!("account index {index} out of range"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(logging::json_requested());

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG).ok())
        .map(PathBuf::from);
    let mut cfg = match &path {
        Some(p) => HarnessConfig::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => HarnessConfig::default(),
    };
    cfg.apply_env()?;
    if let Some(f) = &cfg.networks_file {
        install_network_table(NetworkTable::load(f)?)?;
    }

    let network = network_table().resolve(&cfg.network)?;
    if !network.development {
        bail!(
            "{} is a live network; the node only drives development chains (use lottery-deploy)",
            network.entry.name
        );
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        network = %network.entry.name,
        "lottery node starting"
    );

    let metrics = Arc::new(Metrics::new()?);
    let mut devnet = Devnet::new(DevnetConfig {
        accounts: cfg.devnet.accounts,
        initial_balance: cfg.devnet.initial_balance(),
        genesis_timestamp: cfg.devnet.genesis_timestamp,
    });
    devnet.set_metrics(metrics.clone());
    let notices = devnet.subscribe_requests();

    let store = DeploymentStore::open(&cfg.deploy.store_dir)?;
    let opts = DeployOptions {
        recovery_delay: cfg.deploy.recovery_delay_secs,
        min_stake: cfg.deploy.min_stake()?,
        subscription_fund: cfg.deploy.subscription_fund()?,
    };
    let mut deployer = Deployer::new(devnet, network.clone(), opts)?.with_store(store.clone());
    let ran = deployer.run(cfg.deploy.tags.as_slice())?;
    store.flush()?;
    info!(scripts = ?ran, "deployment finished");

    let lottery = deployer.address(LOTTERY_NAME)?;
    let owner = deployer.deployer();
    let mut devnet = deployer.into_devnet();
    let keeper_account = account(&devnet, cfg.automation.keeper_account)?;
    let oracle_account = account(&devnet, cfg.automation.oracle_account)?;
    let start = devnet.start_lottery(lottery, owner)?;
    info!(%lottery, start_time = start.block.timestamp, "lottery started");
    let shared = devnet.into_shared();

    let keeper = spawn_keeper(
        Keeper::new(shared.clone(), lottery, keeper_account),
        Duration::from_millis(cfg.automation.keeper_interval_ms.max(1)),
    );
    let oracle = spawn_oracle_service(
        OracleService::new(
            shared.clone(),
            oracle_account,
            OracleConfig {
                poll_interval: Duration::from_millis(cfg.automation.oracle_poll_ms.max(1)),
            },
        ),
        notices,
    );
    let miner = (cfg.automation.block_interval_ms > 0).then(|| {
        spawn_miner(
            shared.clone(),
            Duration::from_millis(cfg.automation.block_interval_ms),
        )
    });

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(http::serve(cfg.metrics_addr, metrics, async move {
        let _ = stop_rx.await;
    }));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    keeper.abort();
    oracle.abort();
    if let Some(m) = miner {
        m.abort();
    }
    let _ = stop_tx.send(());
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "metrics endpoint failed"),
        Err(e) => warn!(error = %e, "metrics task panicked"),
    }

    let devnet = shared.lock().await;
    let l = devnet.lottery(&lottery)?;
    info!(
        block = devnet.head().number,
        rounds = l.rounds_resolved(),
        players = l.number_of_players(),
        "stopped"
    );
    Ok(())
}
