mod credentials;
mod loader;
mod model;

pub use credentials::{ACCOUNT_ENV_VAR, Credentials, SECRET_ENV_VAR};
pub use loader::{DEFAULT_CONFIG_PATH, ENV_PREFIX, load_config};
pub use model::{
    Config, DownloadConfig, IdentifiersConfig, PortalConfig, SelectorsConfig, TimingConfig,
    WebDriverConfig,
};
