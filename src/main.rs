use anyhow::Context;
use hatch::{
    AppState, HatchConfigManager, Mailer, SmtpMailer, api,
    cli::{
        Cli, Commands, FaqCommands,
        init::{self, InitConfig, InitResult},
        inspect,
        output::Output,
    },
    utils::toml_config::{LogFormat, ServerConfig},
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap so HATCH_CONFIG can come from it
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Output::from_flags(cli.no_color);

    match run(cli, &output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<ExitCode> {
    match cli.command {
        None | Some(Commands::Serve) => {
            serve(&cli.config, cli.verbose).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                output,
            );
            Ok(match result {
                InitResult::Success => ExitCode::SUCCESS,
                InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
            })
        }
        Some(Commands::Config { full, validate }) => {
            if validate {
                // Warnings are reported but never fail validation
                inspect::validate_config(&cli.config, output)?;
            } else {
                inspect::show_config(&cli.config, full, output)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Faq(command)) => {
            let faq = inspect::load_responder(&cli.config, output)?;
            match command {
                FaqCommands::List => inspect::list_rules(&faq, output),
                FaqCommands::Ask { text } => inspect::ask(&faq, &text, cli.verbose, output),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(config_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let mut manager = HatchConfigManager::new(config_path).with_context(|| {
        format!(
            "Failed to load {} (run 'hatch-server init' to create one)",
            config_path.display()
        )
    })?;
    let config = manager.config();

    init_tracing(&config.server, verbose);
    tracing::info!(path = %manager.config_path().display(), "Configuration loaded");

    if let Err(e) = manager.start_watching() {
        tracing::warn!("Config hot reload disabled: {}", e);
    }

    let mailer = SmtpMailer::from_config(&config)?.map(|mailer| {
        tracing::info!("Contact form mailer ready: {}", mailer.describe());
        Arc::new(mailer) as Arc<dyn Mailer>
    });

    tracing::info!(rules = manager.faq().rules().len(), "FAQ table loaded");

    let state = AppState::new(Arc::new(manager), mailer);
    let app = api::app(state, &config.server);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("hatch-server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hatch={level},hatch_server={level},tower_http={level}").into());

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
