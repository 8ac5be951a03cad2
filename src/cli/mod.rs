use clap::Parser;

use crate::config::{AppConfig, Environment};

#[derive(Debug, Parser)]
#[command(name = "catalog-api")]
#[command(about = "JSON REST backend for books, products, reviews and users")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "API server port")]
    pub port: Option<u16>,

    #[arg(long = "env", help = "Environment preset (development|staging|production)")]
    pub environment: Option<String>,

    #[arg(long = "db-dsn", help = "PostgreSQL DSN (overrides DATABASE_URL)")]
    pub db_dsn: Option<String>,

    #[arg(long, help = "Rate limiter maximum requests per second")]
    pub limiter_rps: Option<f64>,

    #[arg(long, help = "Rate limiter maximum burst")]
    pub limiter_burst: Option<u32>,

    #[arg(long, help = "Enable rate limiter")]
    pub limiter_enabled: Option<bool>,
}

impl Cli {
    /// Resolve the effective configuration: preset, then environment, then flags.
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match self.environment.as_deref() {
            Some(name) => {
                let environment = Environment::parse(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown environment '{}'", name))?;
                AppConfig::preset(environment).with_env_overrides()
            }
            None => AppConfig::from_env(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Flags take precedence over environment variables.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(dsn) = &self.db_dsn {
            config.database.url = Some(dsn.clone());
        }
        if let Some(rps) = self.limiter_rps {
            config.limiter.rps = rps;
        }
        if let Some(burst) = self.limiter_burst {
            config.limiter.burst = burst;
        }
        if let Some(enabled) = self.limiter_enabled {
            config.limiter.enabled = enabled;
        }
    }
}
