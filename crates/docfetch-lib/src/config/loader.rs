use super::Config;
use crate::error::DocFetchError;
use config::Config as ConfigBuilder;

pub const DEFAULT_CONFIG_PATH: &str = "docfetch.yaml";
pub const ENV_PREFIX: &str = "DOCFETCH";

/// Loads the config file (optional unless `required`) and overlays `DOCFETCH__*` variables.
pub fn load_config(config_path: &str, required: bool) -> Result<Config, DocFetchError> {
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path).required(required))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("download.pending_suffixes")
                .try_parsing(true),
        )
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
