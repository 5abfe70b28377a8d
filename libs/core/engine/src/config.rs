use serde::{Deserialize, Serialize};

/// Declared state. The running worker fleet's shape is derived from
/// this record alone — no worker ever mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub connections: u32,
    pub read_qps: f64,
    pub write_qps: f64,
    pub churn_rate: f64,
    pub scenario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_table: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            connections: 0,
            read_qps: 0.0,
            write_qps: 0.0,
            churn_rate: 0.0,
            scenario: "simple".to_string(),
            custom_table: None,
        }
    }
}

impl Configuration {
    /// Whether two configurations differ on a field that requires a
    /// worker fleet restart: connection count, churn rate, or scenario
    /// identity (name *or* custom table).
    pub fn shape_differs_from(&self, other: &Configuration) -> bool {
        self.connections != other.connections
            || self.churn_rate != other.churn_rate
            || self.scenario != other.scenario
            || self.custom_table != other.custom_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_configs_have_no_shape_difference() {
        let a = Configuration::default();
        let b = Configuration::default();
        assert!(!a.shape_differs_from(&b));
    }

    #[test]
    fn rate_only_change_is_not_a_shape_difference() {
        let a = Configuration::default();
        let mut b = Configuration::default();
        b.read_qps = 500.0;
        b.write_qps = 50.0;
        assert!(!a.shape_differs_from(&b));
    }

    #[test]
    fn connection_count_change_is_a_shape_difference() {
        let a = Configuration::default();
        let mut b = Configuration::default();
        b.connections = 10;
        assert!(a.shape_differs_from(&b));
    }
}
