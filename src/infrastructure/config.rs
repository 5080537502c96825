use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    pub delimiter: String,
    pub include_bom: bool,
}

impl ExportSettings {
    /// First byte of the configured delimiter, comma when empty or non-ASCII
    pub fn delimiter(&self) -> u8 {
        self.delimiter
            .bytes()
            .next()
            .filter(u8::is_ascii)
            .unwrap_or(b',')
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults, then `config/level_note.*` if present, then `LEVEL_NOTE__*`
/// environment variables (e.g. `LEVEL_NOTE__SERVER__PORT=9000`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/level_note").required(false))
        .add_source(
            config::Environment::with_prefix("LEVEL_NOTE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("storage.data_dir", "data")?
        .set_default("export.delimiter", ",")?
        .set_default("export.include_bom", true)?)
}
