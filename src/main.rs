use mimalloc::MiMalloc;
use mlagent::pipeline::{DryRunEngine, PipelineManager};
use mlagent::registry::RegistryService;
use mlagent::service::{AgentService, ModelModule, PipelineModule, ResourceModule, ServiceModule};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &mlagent::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.store.database_url,
        key_prefix = %cfg.store.key_prefix,
        bus = ?cfg.basic.bus,
        loglevel = %cfg.basic.loglevel,
        state_timeout_ms = cfg.pipeline.state_timeout_ms,
        teardown_timeout_ms = cfg.pipeline.teardown_timeout_ms
    );

    let db = mlagent::db::open(&cfg.store.database_url, &cfg.store.key_prefix).await?;
    let registry = RegistryService::new(db.clone());
    let manager = Arc::new(PipelineManager::new(
        Arc::new(DryRunEngine::new()),
        Arc::new(registry.clone()),
        &cfg.pipeline,
    ));

    // Load order; exit runs in reverse.
    let modules: Vec<Arc<dyn ServiceModule>> = vec![
        Arc::new(PipelineModule::new(registry.clone(), Arc::clone(&manager))),
        Arc::new(ModelModule::new(registry.clone())),
        Arc::new(ResourceModule::new(registry)),
    ];
    let service = Arc::new(AgentService::start(modules).await);
    info!(modules = ?service.module_names(), "agent service ready");

    let state = mlagent::server::AgentState::new(Arc::clone(&service));
    let app = mlagent::server::agent_router(state);

    let addr = cfg.basic.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("agent listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.shutdown().await;
    db.stop();
    info!("Agent has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
