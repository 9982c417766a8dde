use std::path::Path;

use tilepack::{Config, ListRegistry};

use crate::cli::global::GlobalArgs;

/// Built-in configuration plus either the `--config` file or the standard
/// override locations.
pub fn load(global: &GlobalArgs) -> Result<Config, Box<dyn std::error::Error>> {
    match &global.config {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            let mut config = Config::load_default()?;
            config.merge(Config::load_from_file(Path::new(expanded.as_ref()))?);
            Ok(config)
        }
        None => Ok(Config::load_with_overrides()?),
    }
}

pub fn registry(config: &Config) -> Result<ListRegistry, Box<dyn std::error::Error>> {
    Ok(ListRegistry::from_config(config)?)
}
