use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use error::ConfigError;
pub use settings::{
    Config, DashboardSettings, DataSettings, LogFormat, LoggingSettings, ServerSettings,
};

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "shoplens";

/// Prefix of environment overrides, e.g. `SHOPLENS__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "SHOPLENS";

/// Loads the application configuration.
///
/// Sources are layered, later ones winning: built-in defaults, then the
/// configuration file, then `SHOPLENS__*` environment variables. When `path`
/// is given the file must exist; otherwise `shoplens.toml` in the working
/// directory is used if present.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let defaults = config::Config::try_from(&Config::default())?;

    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(defaults)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
