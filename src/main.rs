use clap::Parser;
use static_server::config::{AppState, Config, Overrides};
use static_server::{logger, server};
use std::sync::Arc;

/// Serve one fixed file or a directory tree over HTTP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file, extension optional; a missing file is ignored
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Listen address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Document root served in directory mode
    #[arg(long, env = "ROOT_DIR", conflicts_with = "file_path")]
    root_dir: Option<String>,

    /// Serve this one file for every request path
    #[arg(long, env = "FILE_PATH")]
    file_path: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    show_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            root_dir: self.root_dir.clone(),
            file_path: self.file_path.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config, &cli.overrides())?;

    if cli.show_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    logger::init(&cfg)?;
    let state = AppState::new(cfg).inspect_err(|e| logger::log_error(e))?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = state.config.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(server::run(Arc::new(state)))
}
