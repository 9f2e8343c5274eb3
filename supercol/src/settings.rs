use crate::client::{ConsistencyLevel, Endpoint};
use crate::converter::SerializeUnknown;
use crate::error::AppError;
use crate::info;
use config::{Config, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::sync::Once;

pub const DEFAULT_PORT: u16 = 9160;

static DOTENV_ONCE: Once = Once::new();

fn ensure_dotenv_loaded() {
    DOTENV_ONCE.call_once(|| match dotenv() {
        Ok(_) => info!("Settings loaded including .env file."),
        Err(_) => info!("Settings loaded without .env file."),
    });
}

/// Connection and mapping settings consumed by [`crate::DaoFactory::from_settings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub keyspace: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub consistency: ConsistencyLevel,
    #[serde(default)]
    pub serialize_unknown: SerializeUnknown,
}

impl StoreSettings {
    /// Single host (port defaults to 9160) or node list; `None` when neither is configured.
    pub fn endpoint(&self) -> Result<Option<Endpoint>, AppError> {
        let host = self.host.as_deref().filter(|h| !h.is_empty());
        match (host, self.nodes.is_empty()) {
            (Some(_), false) => Err(AppError::configuration("both host and nodes are configured, pick one")),
            (Some(host), true) => Ok(Some(Endpoint::Single { host: host.to_string(), port: self.port.unwrap_or(DEFAULT_PORT) })),
            (None, false) => Ok(Some(Endpoint::Nodes(self.nodes.clone()))),
            (None, true) if self.port.is_some() => Err(AppError::configuration("port is configured without a host")),
            (None, true) => Ok(None),
        }
    }
}

/// Loads settings from `path` (any format `config` detects), overridden by
/// `<PREFIX>__<FIELD>` environment variables; `nodes` may be comma separated.
pub fn load_settings(path: &str, prefix: &str) -> Result<StoreSettings, AppError> {
    ensure_dotenv_loaded();

    let builder = Config::builder().add_source(File::with_name(path).required(true)).add_source(
        Environment::with_prefix(prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("nodes"),
    );

    let settings = builder.build()?.try_deserialize::<StoreSettings>()?;
    info!("{:#?}", settings);
    Ok(settings)
}
