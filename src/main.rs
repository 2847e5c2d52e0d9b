//! Seller Dashboard API
//!
//! Reads configuration from TOML (`$SELLER_DASHBOARD_CONFIG` or
//! ~/.config/seller-dashboard/config.toml), then environment overrides.

use tracing::{error, info, warn};

use seller_dashboard::server::{init_tracing, ServerHandle, ServerOptions};
use seller_dashboard::{config_path_from_env, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_env();
    let (mut app_cfg, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    app_cfg.apply_env_overrides();

    init_tracing(&app_cfg);

    match load_error {
        None => info!(path = %config_path.display(), "Configuration loaded"),
        Some(e) => warn!(path = %config_path.display(), error = %e, "Failed to load config, using defaults"),
    }

    let handle = match ServerHandle::start(ServerOptions {
        config: app_cfg,
        auto_migrate: true,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start server");
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Server started. Press Ctrl+C to shut down gracefully.");

    handle.wait().await;
    Ok(())
}
