//! Shared bootstrap for the gallery binaries.
//!
//! Each binary is parameterless: the only configuration is the
//! `EARTHDATA_DIR` environment variable (optionally via `.env`) and the
//! product constants compiled into the binary.

use pipeline::Product;
use renderer::{RenderConfig, Renderer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging and load `.env` if present. Absence of the file
/// is not an error.
pub fn init() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Run a product through the pipeline and exit with a code from the
/// error taxonomy.
pub fn run(product: &Product) -> ! {
    let renderer = Renderer::new(RenderConfig::default());
    match pipeline::run(product, &renderer) {
        Ok(paths) => {
            for path in &paths {
                info!(path = %path.display(), "figure written");
            }
            std::process::exit(0);
        }
        Err(err) => {
            error!(error = %err, "pipeline failed");
            std::process::exit(err.exit_code());
        }
    }
}
