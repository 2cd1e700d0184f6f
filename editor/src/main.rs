use anyhow::Result;

mod app;
mod config;
mod state;
mod ui;

fn main() -> Result<()> {
    let config = config::EditorConfig::load()?;
    app::logging::init(&config.log_path)?;

    log::info!("starting editor against {}", config.api_url);
    app::run::run(config)
}
