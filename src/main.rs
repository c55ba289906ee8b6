//! Predict UI Frontend Entry Point

mod app;
mod components;
mod config;
mod dom;
mod editor;
mod error;
mod links;
mod nav;
mod transport;

use log::LevelFilter;

use config::PageConfig;

fn main() {
    console_error_panic_hook::set_once();

    let config = config::load();
    let level = config
        .as_ref()
        .map(|config| console_logger::parse_level(&config.log_level))
        .unwrap_or(LevelFilter::Info);
    console_logger::init(level).ok();

    let config = config.unwrap_or_else(|e| {
        log::warn!("Using default config: {}", e);
        PageConfig::default()
    });

    if let Err(e) = dom::when_ready(move || app::start(config)) {
        log::error!("Page never became ready: {}", e);
    }
}
