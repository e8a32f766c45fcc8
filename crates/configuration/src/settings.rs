use core_types::OrderStatus;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or missing `shoplens.toml` is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub server: ServerSettings,
    pub dashboard: DashboardSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.dashboard.top_categories == 0 {
            return Err(ConfigError::ValidationError(
                "dashboard.top_categories must be greater than 0".to_string(),
            ));
        }
        if self.dashboard.top_states == 0 {
            return Err(ConfigError::ValidationError(
                "dashboard.top_states must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the six input tables live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory holding the CSV files.
    pub dir: PathBuf,
    pub orders_file: String,
    pub order_items_file: String,
    pub products_file: String,
    pub customers_file: String,
    pub reviews_file: String,
    pub payments_file: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ecommerce_data"),
            orders_file: "orders_dataset.csv".to_string(),
            order_items_file: "order_items_dataset.csv".to_string(),
            products_file: "products_dataset.csv".to_string(),
            customers_file: "customers_dataset.csv".to_string(),
            reviews_file: "order_reviews_dataset.csv".to_string(),
            payments_file: "order_payments_dataset.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// Resolves `host:port` into the address the dashboard binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::ValidationError(format!("server.host '{}': {e}", self.host)))?
            .next()
            .ok_or_else(|| {
                ConfigError::ValidationError(format!("server.host '{}' did not resolve", self.host))
            })
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Presentation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub title: String,
    /// Year selected on first load when the data contains it. Otherwise the latest year is used.
    pub default_year: Option<i32>,
    /// Status selected on first load. `None` shows every status.
    pub default_status: Option<OrderStatus>,
    /// How many categories the category chart shows.
    pub top_categories: usize,
    /// How many states the geographic chart shows.
    pub top_states: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "E-commerce Analytics Dashboard".to_string(),
            default_year: Some(2023),
            default_status: Some(OrderStatus::Delivered),
            top_categories: 10,
            top_states: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Full,
}
