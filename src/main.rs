use anyhow::Context;
use signal::{
    api::routes::create_router,
    cli::{
        init::{self, InitResult},
        output::Output,
        run::{self, RunOptions},
        Cli, Commands,
    },
    llm::{LLMClient, Provider},
    AppState, ConfigManager, SerpApiSource, SignalConfig, TursoClient,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init { path, force }) => match init::run(&path, force, &output) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
        },
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::Run {
            topic,
            focus,
            depth,
            tone,
        }) => {
            let config = SignalConfig::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            init_tracing(&config, cli.verbose, Some("warn"));
            let options = RunOptions {
                topic,
                focus,
                depth,
                tone,
            };
            match run::run(&config, options, &output).await {
                Ok(_) => Ok(()),
                Err(e) => {
                    output.error(&e.to_string());
                    std::process::exit(1);
                }
            }
        }
        None => serve(&cli.config, cli.verbose).await,
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. `quiet_level` replaces the
/// configured level for commands that print their own progress.
fn init_tracing(config: &SignalConfig, verbose: bool, quiet_level: Option<&str>) {
    let default_level = match (verbose, quiet_level) {
        (true, _) => "debug".to_string(),
        (false, Some(level)) => level.to_string(),
        (false, None) => format!(
            "signal={0},signal_server={0},tower_http=info",
            config.server.log_level
        ),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.server.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn show_config(path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    output.header("Configuration");
    output.kv("file", &path.display().to_string());

    let config = match SignalConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            output.hint("Run 'signal-server init' to create a default configuration");
            std::process::exit(1);
        }
    };

    output.kv("server", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("database", &config.database.url);
    output.kv(
        "llm",
        &format!("{:?} / {}", config.llm.provider, config.llm.model),
    );
    output.kv("sources per search", &config.search.num_sources.to_string());
    output.kv(
        "stage timeout",
        &format!("{}s", config.pipeline.stage_timeout_secs),
    );

    if validate {
        let missing = config.missing_secrets();
        if missing.is_empty() {
            output.success("Configuration is valid");
        } else {
            for name in &missing {
                output.error(&format!("Environment variable {} is not set", name));
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn serve(config_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let config_manager = Arc::new(
        ConfigManager::new(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?,
    );
    let config = config_manager.config();
    init_tracing(&config, verbose, None);

    for name in config.missing_secrets() {
        tracing::warn!(env = %name, "Secret referenced by the configuration is not set");
    }
    if let Err(e) = config_manager.start_watching() {
        tracing::warn!("Config hot-reload disabled: {}", e);
    }

    let store = Arc::new(TursoClient::connect(&config.database.url).await?);
    tracing::info!(url = %config.database.url, "Report database ready");

    let provider = Provider::from_config(&config)?;
    let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client().await?);
    tracing::info!(provider = provider.name(), model = %config.llm.model, "LLM client ready");

    let source = Arc::new(SerpApiSource::from_config(&config)?);
    let state = AppState::new(config_manager.clone(), llm, source, store);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Signal listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    config_manager.stop_watching();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
