pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{load_orders, parse_orders};
pub use toml_loader::{load_settings, load_settings_or_default};
