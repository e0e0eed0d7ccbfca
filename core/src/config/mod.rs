mod load;
mod types;

pub use load::{apply_env_overrides, get_triage_data_dir, load_default, load_from};
pub use types::{AppConfig, LoggingConfig, RelayConfig, TuiConfig};
