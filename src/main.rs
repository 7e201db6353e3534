use useradmin::{app, config::LogConfig, state::AppState};

fn init_tracing(config: &LogConfig) {
    let builder = tracing_subscriber::fmt().with_env_filter(config.filter.as_str());
    if config.json {
        builder.with_target(false).json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(&LogConfig::from_env());

    let app_state = AppState::init().await?;
    let config = app_state.config.clone();
    tracing::info!(
        users = app_state.store.read().await.len(),
        seed = %config.seed_path,
        "store ready"
    );

    app::serve(app::build_app(app_state), &config).await
}
