// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use confidential_payroll::{
    api::router,
    blockchain::{
        signing::{signer_from_hex, signer_from_pem_file, wallet_from_signer},
        types::{sepolia, NetworkConfig},
        PayrollLedgerClient,
    },
    compute::RelayerClient,
    config::{AppConfig, SignerSource, DEFAULT_CHAIN_ID},
    models::WalletAddress,
    payroll::{PayrollService, SyncPoller, WorkflowSettings},
    state::AppState,
    telemetry::init_tracing,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let signer = match &config.signer {
        SignerSource::PemFile(path) => signer_from_pem_file(path)?,
        SignerSource::Hex(hex) => signer_from_hex(hex)?,
    };
    let identity = WalletAddress::from(signer.address().to_checksum(None));

    let network = network_for(&config);
    info!(network = %network.name, chain_id = network.chain_id, "Connecting to ledger");

    let ledger = PayrollLedgerClient::new(
        network,
        &config.contract_address,
        Some(wallet_from_signer(signer)),
    )?
    .with_receipt_poll_interval(config.receipt_poll_interval);
    let target = ledger.contract_address();

    let compute = RelayerClient::new(config.relayer_url.clone())?;

    let service = Arc::new(PayrollService::new(
        Arc::new(ledger),
        Arc::new(compute),
        target,
        WorkflowSettings {
            confirmation_timeout: config.confirmation_timeout,
        },
    ));

    // Startup continues when the relayer or ledger is down; the session can
    // be initialized later through the API.
    service.connect(identity).await;
    match service.ensure_ready().await {
        Ok(_) => {
            if let Err(e) = service.sync_all().await {
                warn!(error = %e, "Initial sync failed");
            }
        }
        Err(e) => warn!(error = %e, "Confidential compute not ready at startup"),
    }

    let shutdown = CancellationToken::new();
    let poller = config.sync_interval.map(|interval| {
        tokio::spawn(SyncPoller::new(service.clone(), interval).run(shutdown.clone()))
    });

    let app = router(AppState::new(service));
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Confidential payroll server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(handle) = poller {
        let _ = handle.await;
    }
    info!("Server shut down");

    Ok(())
}

fn network_for(config: &AppConfig) -> NetworkConfig {
    if config.chain_id == DEFAULT_CHAIN_ID {
        sepolia(config.rpc_url.clone())
    } else {
        NetworkConfig {
            name: format!("Chain {}", config.chain_id),
            chain_id: config.chain_id,
            rpc_url: config.rpc_url.clone(),
            explorer_url: None,
        }
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
        _ = shutdown.cancelled() => {},
    }
    shutdown.cancel();
}
