use crate::config::{Config, Credentials};

#[derive(Debug, Clone)]
pub struct RunParams {
    pub app_config: Config,
    pub credentials: Credentials,
}

#[derive(Debug, Clone)]
pub struct CheckParams {
    pub app_config: Config,
}
