use gateway_response::config::Config;
use gateway_response::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension, e.g. `config` for config.toml
    let cfg = match std::env::args().nth(1) {
        Some(config_path) => Config::load_from(&config_path)?,
        None => Config::load()?,
    };

    logger::init(&cfg.logging)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "Using configured worker threads");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(server::run(cfg))
}
