mod cli;
mod config;
mod display;
mod session;
mod source;
mod streaming;

use cli::Cli;
use colorthresh_engine::ThresholdEngine;
use config::Config;
use display::WindowSurface;
use session::{Session, Surface};
use streaming::DashboardSurface;
use tracing_subscriber::{prelude::*, reload, EnvFilter, Registry};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn init_tracing() -> FilterHandle {
    let (env_filter, handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    let stdout_log = tracing_subscriber::fmt::layer().compact();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_log)
        .init();
    handle
}

// RUST_LOG wins over the configured level.
fn apply_log_level(handle: &FilterHandle, level: &str) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!(error = %e, "Could not apply log level");
            }
        }
        Err(e) => tracing::warn!(error = %e, level, "Invalid log level in configuration"),
    }
}

fn main() -> anyhow::Result<()> {
    let log_handle = init_tracing();

    let cli = Cli::parse_or_default(std::env::args_os());
    let config = Config::load_or_default(cli.config.as_deref());
    apply_log_level(&log_handle, &config.system.log_level);
    tracing::info!("colorthresh waking up...");

    let selection = cli.selection();
    let mut source = source::open_source(&selection, &config.camera)?;

    let mut surfaces: Vec<Box<dyn Surface>> = Vec::new();
    if config.display.enabled && !cli.no_window {
        surfaces.push(Box::new(WindowSurface::open(&config.display)?));
    }
    if cli.dashboard || config.web.enabled {
        let dashboard = DashboardSurface::start(config.web.port)?;
        tracing::info!(address = %dashboard.address(), "Dashboard ready");
        surfaces.push(Box::new(dashboard));
    }
    if surfaces.is_empty() {
        tracing::warn!("No display surface; thresholding without interaction");
    }

    let mut engine = ThresholdEngine::with_range_mode(config.threshold.range_mode);
    if let Some(name) = &cli.colorspace {
        if let Err(e) = engine.select_representation(name) {
            tracing::warn!(error = %e, "Starting in {}", engine.current_representation_name());
        }
    }
    let mut session = Session::new(engine, surfaces);
    let summary = session.run(source.as_mut())?;

    tracing::info!(frames = summary.frames, "Session ended");
    println!("{}", toml::to_string_pretty(&summary.snapshot)?);
    Ok(())
}
