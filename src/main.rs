use clap::{Parser, Subcommand};
use relay::{
    providers::{build_provider_stack, AssistantTask, AssistantTaskType},
    router::{classify, redact, RouteMode},
    Config, RelayError, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Multi-backend language model router with per-model fallback")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Start {
        /// Override server host
        #[arg(long)]
        host: Option<String>,

        /// Override server port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate configuration
    Config,

    /// Print the task class of a prompt
    Classify { prompt: String },

    /// Print a prompt as it would be sent to a backend
    Redact { prompt: String },

    /// Send one prompt through the configured provider chain
    Route {
        prompt: String,

        /// Candidate width: fast (top 3) or best (all)
        #[arg(long)]
        mode: Option<RouteMode>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Start { host, port } => start_server(host, port).await,
        Commands::Config => validate_config(),
        Commands::Classify { prompt } => {
            println!("{}", classify(&prompt));
            Ok(())
        }
        Commands::Redact { prompt } => {
            println!("{}", redact(&prompt));
            Ok(())
        }
        Commands::Route { prompt, mode } => route_once(prompt, mode).await,
    }
}

async fn start_server(host: Option<String>, port: Option<u16>) -> Result<()> {
    info!("Starting relay server...");

    let mut config = Config::load()?;

    // Override config with CLI args if provided
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let server = relay::server::RelayServer::new(config);
    server.start().await
}

async fn route_once(prompt: String, mode: Option<RouteMode>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(mode) = mode {
        config.router.default_mode = mode;
    }

    let stack = build_provider_stack(&config);
    let task = AssistantTask::new(AssistantTaskType::Chat, prompt);

    // Ctrl-C aborts in-flight backend calls
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = stack.chain.generate(&task, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn validate_config() -> Result<()> {
    info!("Validating configuration...");

    match Config::load() {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Provider mode: {:?}", config.provider_mode);
            println!(
                "  Router: {} ({})",
                config.router.resolved_base_url(),
                credential_status(config.router.resolved_api_key().is_some())
            );
            println!(
                "  Gateway: {} model {} ({})",
                config.gateway.resolved_base_url(),
                config.gateway.model,
                credential_status(config.gateway.resolved_api_key().is_some())
            );
            println!(
                "  Circuit: {} failures / {}s window, {}s cooldown",
                config.circuit.failure_threshold,
                config.circuit.window_secs,
                config.circuit.cooldown_secs
            );

            if let Ok(config_dir) = Config::config_dir() {
                println!("  Config directory: {}", config_dir.display());
            }

            println!();
            println!("{}", config.render_toml()?);

            Ok(())
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            Err(e)
        }
    }
}

fn credential_status(present: bool) -> &'static str {
    if present { "credential set" } else { "no credential, disabled" }
}

fn init_tracing(verbose: bool) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // Load config to get logging preferences
    let config = Config::load().unwrap_or_default();

    let default_level = if verbose { "debug" } else { config.server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter);

    // Add file logging if enabled
    if config.server.log_file_enabled {
        let log_dir = config.log_dir()?;

        let rotation = match config.server.log_rotation.as_str() {
            "minutely" => Rotation::MINUTELY,
            "hourly" => Rotation::HOURLY,
            "daily" => Rotation::DAILY,
            "never" => Rotation::NEVER,
            _ => {
                eprintln!(
                    "Warning: Invalid log rotation '{}', using daily",
                    config.server.log_rotation
                );
                Rotation::DAILY
            }
        };

        let file_appender =
            RollingFileAppender::new(rotation, &log_dir, &config.server.log_file_prefix);

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        registry
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init()
            .map_err(|e| RelayError::Other(format!("Failed to initialize tracing: {}", e)))?;

        // The writer must outlive every log call
        std::mem::forget(guard);
    } else {
        registry
            .try_init()
            .map_err(|e| RelayError::Other(format!("Failed to initialize tracing: {}", e)))?;
    }

    Ok(())
}
