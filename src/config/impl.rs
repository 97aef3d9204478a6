use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::AppConfig;

static CONFIG: OnceLock<ArcSwap<AppConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<AppConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from "linkfolio.toml" in the current directory.
/// If the file doesn't exist, uses in-memory defaults.
pub fn init_config() {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(AppConfig::load("linkfolio.toml")));
}

/// Initialize with an explicit configuration (startup args / tests)
pub fn init_config_with(config: AppConfig) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(config));
}

/// Replace the running configuration
pub fn update_config(config: AppConfig) {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .store(Arc::new(config));
}
