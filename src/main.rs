use std::path::PathBuf;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use wishtree::config::WishtreeConfig;
use wishtree::error::ViewerError;

/// Logs go to stderr. `WISHTREE_LOG` (or `RUST_LOG`) overrides the default
/// filter, e.g. `WISHTREE_LOG=wishtree=debug`.
fn init_tracing() {
    let filter = std::env::var("WISHTREE_LOG")
        .ok()
        .and_then(|filter| EnvFilter::try_new(filter).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| {
            EnvFilter::new("wishtree=info").add_directive(Level::WARN.into())
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config path from the first argument, then `WISHTREE_CONFIG`.
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("WISHTREE_CONFIG").map(PathBuf::from))
}

fn load_config() -> Result<WishtreeConfig, ViewerError> {
    match config_path() {
        Some(path) => {
            tracing::info!("loading config from {}", path.display());
            Ok(WishtreeConfig::load(&path)?)
        }
        None => Ok(WishtreeConfig::default()),
    }
}

fn main() -> Result<(), ViewerError> {
    init_tracing();

    let config = load_config()?;
    wishtree::viewer::run(config)
}
