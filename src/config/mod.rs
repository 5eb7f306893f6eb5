pub mod toml_config;

pub use toml_config::{RecognitionMode, RelayConfig};

use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "med-relay.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "med-relay")]
#[command(about = "Identifies a medicine from a photo and looks it up in the public drug catalog")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults apply when med-relay.toml is absent)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override server.host from config
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port from config
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 載入配置檔並套用命令列覆蓋設定
    pub fn load(&self) -> Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                RelayConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => RelayConfig::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }
}
