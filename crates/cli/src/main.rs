use clap::{Parser, Subcommand};
use std::io::Read;

#[derive(Parser)]
#[command(name = "replybot")]
#[command(about = "LINE to OpenAI reply relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file. Secrets stay in the environment.
    Init {
        /// Config file path (default: REPLYBOT_CONFIG_PATH or ~/.replybot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway: POST /webhook for LINE, POST /invoke for function-style envelopes.
    Gateway {
        /// Config file path (default: REPLYBOT_CONFIG_PATH or ~/.replybot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15151)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run the relay once for an envelope ({"body": "<webhook JSON>"}) and print the outcome.
    Invoke {
        /// Config file path (default: REPLYBOT_CONFIG_PATH or ~/.replybot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// File holding the envelope JSON (default: stdin)
        #[arg(long, short, value_name = "FILE")]
        event: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("replybot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Invoke { config, event }) => match run_invoke(config, event).await {
            Ok(out) if out.is_success() => {}
            Ok(_) => std::process::exit(1),
            Err(e) => {
                log::error!("invoke failed: {:#}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    lib::gateway::run_gateway(config).await
}

/// Prints the outcome JSON and returns the outcome.
async fn run_invoke(
    config_path: Option<std::path::PathBuf>,
    event: Option<std::path::PathBuf>,
) -> anyhow::Result<lib::channels::OutcomeResponse> {
    use anyhow::Context;

    let (config, _) = lib::config::load_config(config_path)?;
    let raw = match event {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading event from {}", path.display()))?,
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("reading event from stdin")?;
            s
        }
    };

    let invocation_id = uuid::Uuid::new_v4().to_string();
    let handler = lib::gateway::build_handler(&config);
    let out = match serde_json::from_str::<lib::channels::InboundEnvelope>(&raw) {
        Ok(envelope) => handler.invoke(&invocation_id, &envelope).await,
        Err(e) => {
            let err = lib::relay::RelayError::Decode(e);
            log::warn!("{}", lib::relay::fault_line(&invocation_id, &err));
            err.to_response()
        }
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(out)
}
