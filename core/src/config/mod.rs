mod load;
mod types;

pub use load::{
    apply_env_overrides, is_debug_serial, load_default, load_from, DEBUG_SERIAL, SETTINGS_FILE,
};
pub use types::{LoggingConfig, RunnerConfig, Settings, DEFAULT_MAX_PARALLEL};
