#![windows_subsystem = "windows"]

use anyhow::Result;
use regen_agri::{config::Config, gui, user_settings::UserSettings};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let settings = UserSettings::load();
    let config = Config::from_settings_and_env(&settings);
    tracing::info!(
        "Starting RegenAgri on {} (chain {}){}",
        config.network_label(),
        config.chain_id,
        if config.demo_mode { " in demo mode" } else { "" }
    );
    gui::launch(config, settings)
}
