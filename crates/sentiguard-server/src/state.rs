//! Shared application state

use crate::auth::SessionStore;
use crate::config::{MailerMode, ServerConfig};
use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use sentiguard_classifiers::CommentOracle;
use sentiguard_core::MonitoredAccount;
use sentiguard_engine::{IngestEngine, LinkageService};
use sentiguard_graph::GraphApiClient;
use sentiguard_notify::{HttpMailer, LogMailer, Mailer, NotificationDispatcher};
use sentiguard_store::{MemoryStore, Store};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub engine: Arc<IngestEngine>,
    pub linkage: Arc<LinkageService>,
    pub sessions: Arc<SessionStore>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(config: &ServerConfig, metrics: PrometheusHandle) -> anyhow::Result<Self> {
        let store: Arc<MemoryStore> = match &config.journal_path {
            Some(path) => {
                info!(path, "opening journal-backed store");
                Arc::new(MemoryStore::open(path).context("failed to open journal")?)
            }
            None => {
                info!("running with in-memory store, no journal");
                Arc::new(MemoryStore::new())
            }
        };

        if let Some(accounts_file) = &config.accounts_file {
            seed_accounts(store.as_ref(), accounts_file)?;
        }

        let oracle = Arc::new(CommentOracle::new().context("failed to build oracle")?);
        let graph = Arc::new(GraphApiClient::new().context("failed to build graph client")?);

        let mailer: Arc<dyn Mailer> = match config.mailer.mode {
            MailerMode::Log => Arc::new(LogMailer),
            MailerMode::Http => Arc::new(HttpMailer::new(
                &config.mailer.endpoint,
                &config.mailer.api_key,
                &config.mailer.from,
            )?),
        };
        let dispatcher = Arc::new(NotificationDispatcher::new(mailer, &config.dashboard_url));

        let engine = Arc::new(IngestEngine::new(
            store.clone(),
            oracle,
            graph,
            dispatcher,
        ));
        let linkage = Arc::new(LinkageService::new(store.clone()));

        Ok(Self {
            store,
            engine,
            linkage,
            sessions: Arc::new(SessionStore::new()),
            metrics,
        })
    }
}

/// Seed or rotate pool credentials from the operator YAML file
fn seed_accounts(store: &dyn Store, path: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read accounts file {path}"))?;
    let accounts: Vec<MonitoredAccount> =
        serde_yaml::from_str(&content).context("malformed accounts file")?;

    let count = accounts.len();
    for account in accounts {
        store.seed_account(account)?;
    }
    info!(count, path, "monitored account pool seeded");
    Ok(())
}
