mod service;

pub use service::{
    apply_env_overrides, load_settings_or_default, SettingsService, API_URL_ENV, TOKEN_ENV,
};
