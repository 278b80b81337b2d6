//! Demo CLI for the RF frame decoding gateway.
//!
//! Reads firmware lines from a file (or stdin) and prints each decoded
//! message as JSON, one per line. Logging and config loading follow the
//! same `tracing-subscriber`/`anyhow` setup the teacher's own `main.rs`
//! uses, trimmed of its TUI/radio concerns.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};

use sdgw::catalog::Catalog;
use sdgw::config::Config;
use sdgw::logging;
use sdgw::pipeline::decode_line;

fn load_catalog(config: &Config) -> Result<Catalog> {
    let bundled = Catalog::bundled();
    match &config.catalog_path {
        Some(path) => {
            let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
            let overlay = if is_toml {
                Catalog::from_toml_file(path)
            } else {
                Catalog::from_json_file(path)
            }
            .with_context(|| format!("loading catalog override from {}", path.display()))?;
            Ok(bundled.merge(overlay))
        }
        None => Ok(bundled),
    }
}

fn main() -> Result<()> {
    let config = Config::load_default().unwrap_or_default();

    logging::init(config.log_level);

    tracing::info!("sdgw starting, rfmode={}", config.rfmode);

    let catalog = load_catalog(&config)?;
    tracing::debug!("loaded {} protocol descriptors", catalog.len());

    let path: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let lines: Box<dyn Iterator<Item = io::Result<String>>> = match path {
        Some(p) => {
            let file = std::fs::File::open(&p).with_context(|| format!("opening {}", p.display()))?;
            Box::new(io::BufReader::new(file).lines())
        }
        None => Box::new(io::stdin().lock().lines()),
    };

    for line in lines {
        let line = line.context("reading input line")?;
        for message in decode_line(&catalog, &config.rfmode, &line) {
            let json = serde_json::to_string(&message).context("serializing decoded message")?;
            println!("{json}");
        }
    }

    Ok(())
}
