//! Profile admin entry point.
//!
//! # Purpose
//! Seeds an in-memory policy store, warms the catalog cache, and logs a
//! summary of every profile. Metrics are rendered to stdout on Ctrl-C.
use anyhow::Context;
use profile_admin::ProfileAdmin;
use profile_admin::config::AdminConfig;
use profile_admin::observability;
use profile_admin::seed::SeedData;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let metrics_handle = observability::init_observability();
    let config = AdminConfig::from_env_or_yaml()?;

    let seed = match &config.seed_path {
        Some(path) => SeedData::from_path(path)?,
        None => SeedData::bundled()?,
    };
    let store = Arc::new(seed.into_store(config.classifier()).await?);
    let admin = ProfileAdmin::from_config(store, &config);

    admin.health_check().await.context("store health check")?;
    let catalog = admin.catalog().await.context("load catalog")?;
    tracing::info!(
        backend = admin.backend_name(),
        strategy = admin.strategy().as_str(),
        features = catalog.len(),
        "profile admin ready"
    );

    for summary in admin.list_profiles().await.context("list profiles")? {
        tracing::info!(
            profile_id = %summary.profile.id,
            name = %summary.profile.name,
            kind = %summary.kind,
            active = summary.profile.active,
            granted_features = summary.granted_features,
            "profile"
        );
    }
    let users = admin.list_users().await.context("list users")?;
    tracing::info!(users = users.len(), "users loaded");

    let _ = tokio::signal::ctrl_c().await;
    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }
    Ok(())
}
