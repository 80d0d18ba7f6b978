/// TOML configuration (`hatch.toml`) with hot reload.
pub mod toml_config;
