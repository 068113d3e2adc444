//! API server command (`issue-scout serve`).

use anyhow::Result;
use tracing::warn;

use issue_scout::backend::server::start_server;
use issue_scout::config::Config;

pub async fn cmd_serve(mut config: Config, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    for warning in config.validate() {
        warn!("{}", warning);
    }

    start_server(&config).await
}
