mod api;
mod router;
mod state;
mod tms;

use std::sync::Arc;

use tracing::{info, warn};

use fraudgate_cluster::{InventorySource, KubeClient};
use fraudgate_store::{PgResultStore, ResultStore};

fn load_config() -> fraudgate_core::Config {
    fraudgate_core::config::load_dotenv();
    fraudgate_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    config.log_summary();

    // Databases are owned by the pipeline; the gateway stays up and answers
    // 503 on result routes when they are unreachable at boot.
    let store: Option<Arc<dyn ResultStore>> =
        match PgResultStore::connect(&config.eval_db, &config.event_db).await {
            Ok(s) => {
                info!("Result store connected");
                Some(Arc::new(s))
            }
            Err(e) => {
                warn!("Result store unavailable: {} — result routes will answer 503", e);
                None
            }
        };

    let (inventory, kube): (Option<Arc<dyn InventorySource>>, Option<Arc<KubeClient>>) =
        match KubeClient::from_config(&config.cluster) {
            Ok(client) => {
                let client = Arc::new(client);
                (Some(client.clone()), Some(client))
            }
            Err(e) => {
                warn!("Cluster client unavailable: {} — system routes will answer 503", e);
                (None, None)
            }
        };

    let tms = tms::TmsClient::from_config(&config.pipeline);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(state::AppState {
        config,
        store,
        inventory,
        kube,
        tms,
    });

    let app = router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
