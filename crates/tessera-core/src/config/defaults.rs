//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tessera.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tessera.yaml";

/// Default configuration file name (JSON)
pub const DEFAULT_CONFIG_JSON: &str = "tessera.json";

/// Get list of config file names to search for, in priority order
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        "tessera.yml",
        DEFAULT_CONFIG_JSON,
    ]
}
