//! Settings surface: every value recognized from the environment (or a
//! `.env` file loaded by the binary) and the defaults installed when a
//! value is absent.

use clap::Parser;
use pgload_engine::Configuration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Interactive load generator for connection-pooled relational databases")]
pub struct Settings {
    /// Connection string the worker fleet opens connections against.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Port the HTTP/WebSocket server binds.
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,

    /// Connection count installed before the first `/config` call.
    #[arg(long, env = "PGLOAD_DEFAULT_CONNECTIONS", default_value_t = 0)]
    pub default_connections: u32,

    #[arg(long, env = "PGLOAD_DEFAULT_READ_QPS", default_value_t = 0.0)]
    pub default_read_qps: f64,

    #[arg(long, env = "PGLOAD_DEFAULT_WRITE_QPS", default_value_t = 0.0)]
    pub default_write_qps: f64,

    #[arg(long, env = "PGLOAD_DEFAULT_CHURN_RATE", default_value_t = 0.0)]
    pub default_churn_rate: f64,

    #[arg(long, env = "PGLOAD_DEFAULT_SCENARIO", default_value = "simple")]
    pub default_scenario: String,

    #[arg(long, env = "PGLOAD_DEFAULT_CUSTOM_TABLE")]
    pub default_custom_table: Option<String>,

    /// Advisory ceilings surfaced to the UI; `/config` clamps incoming
    /// requests to them rather than trusting the client.
    #[arg(long, env = "PGLOAD_MAX_CONNECTIONS", default_value_t = 1_000)]
    pub max_connections: u32,

    #[arg(long, env = "PGLOAD_MAX_READ_QPS", default_value_t = 100_000.0)]
    pub max_read_qps: f64,

    #[arg(long, env = "PGLOAD_MAX_WRITE_QPS", default_value_t = 100_000.0)]
    pub max_write_qps: f64,

    /// Cadence at which the metric collector is polled for snapshots.
    #[arg(long, env = "PGLOAD_SNAPSHOT_INTERVAL_MS", default_value_t = 1_000)]
    pub snapshot_interval_ms: u64,
}

impl Settings {
    pub fn initial_configuration(&self) -> Configuration {
        Configuration {
            connections: self.default_connections,
            read_qps: self.default_read_qps,
            write_qps: self.default_write_qps,
            churn_rate: self.default_churn_rate,
            scenario: self.default_scenario.clone(),
            custom_table: self.default_custom_table.clone(),
        }
    }

    /// Clamps a client-supplied configuration to the advisory ceilings.
    pub fn clamp(&self, mut cfg: Configuration) -> Configuration {
        cfg.connections = cfg.connections.min(self.max_connections);
        cfg.read_qps = cfg.read_qps.clamp(0.0, self.max_read_qps);
        cfg.write_qps = cfg.write_qps.clamp(0.0, self.max_write_qps);
        cfg.churn_rate = cfg.churn_rate.max(0.0);
        cfg
    }
}
