use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use repometa::{Commands, Container, ContainerConfig, DomainError, Router};

#[derive(Parser)]
#[command(name = "repometa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.repometa")]
    data_dir: String,

    #[arg(long, global = true)]
    memory_storage: bool,

    #[arg(long, global = true)]
    mock_providers: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data_dir = expand_tilde(&cli.data_dir);
    if !cli.memory_storage {
        std::fs::create_dir_all(&data_dir)?;
    }

    let container = Container::new(ContainerConfig {
        data_dir,
        memory_storage: cli.memory_storage,
        mock_providers: cli.mock_providers,
    })?;
    debug!("Data directory: {}", container.data_dir());
    let router = Router::new(&container);

    match router.route(cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => match e.downcast_ref::<DomainError>() {
            Some(DomainError::NotFound(message)) => {
                eprintln!("not found: {}", message);
                std::process::exit(1);
            }
            _ => Err(e),
        },
    }
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
