use std::collections::HashMap;
use std::sync::Arc;

use crate::scenario::{Scenario, ScenarioDescription};
use crate::scenarios::{DynamicScenario, ForeignKeyJoinScenario, JsonbScenario, SimpleScenario, WideScenario};

type Factory = fn() -> Arc<dyn Scenario>;

/// Names to scenario factories. Built-ins are looked up by name with a
/// fallback to `simple`; a custom table always creates a fresh
/// `DynamicScenario` regardless of what name was also supplied.
pub struct ScenarioRegistry {
    factories: HashMap<&'static str, Factory>,
}

impl ScenarioRegistry {
    pub fn with_builtins() -> Self {
        let mut factories: HashMap<&'static str, Factory> = HashMap::new();
        factories.insert("simple", (|| Arc::new(SimpleScenario::new()) as Arc<dyn Scenario>) as Factory);
        factories.insert("jsonb", (|| Arc::new(JsonbScenario::new()) as Arc<dyn Scenario>) as Factory);
        factories.insert("wide", (|| Arc::new(WideScenario::new()) as Arc<dyn Scenario>) as Factory);
        factories.insert(
            "foreign-key-join",
            (|| Arc::new(ForeignKeyJoinScenario::new()) as Arc<dyn Scenario>) as Factory,
        );
        Self { factories }
    }

    /// Creates a scenario reference for the given identity. A non-empty
    /// `custom_table` always wins and produces a fresh dynamic scenario;
    /// requesting `custom` or `dynamic` by name with no table set does
    /// too, letting discovery pick the first base table itself;
    /// otherwise the name is looked up among the built-ins, falling back
    /// to `simple` when unrecognized.
    pub fn create(&self, name: &str, custom_table: Option<&str>) -> Arc<dyn Scenario> {
        let table = custom_table.filter(|t| !t.trim().is_empty());
        if table.is_some() || name == "custom" || name == "dynamic" {
            return Arc::new(DynamicScenario::new(table.map(str::to_string)));
        }

        match self.factories.get(name) {
            Some(factory) => factory(),
            None => (self.factories.get("simple").expect("simple is always registered"))(),
        }
    }

    /// Lists every built-in's description plus the synthetic `custom`
    /// entry representing the dynamic scenario.
    pub fn describe_all(&self) -> Vec<ScenarioDescription> {
        let mut names: Vec<&&'static str> = self.factories.keys().collect();
        names.sort();

        let mut descriptions: Vec<ScenarioDescription> = names
            .into_iter()
            .map(|name| (self.factories[name])().describe())
            .collect();

        descriptions.push(ScenarioDescription {
            name: "custom".to_string(),
            description: "Introspects an arbitrary table's columns and primary key".to_string(),
            table_name: String::new(),
        });

        descriptions
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_simple() {
        let registry = ScenarioRegistry::with_builtins();
        let scenario = registry.create("does-not-exist", None);
        assert_eq!(scenario.describe().name, "simple");
    }

    #[test]
    fn custom_table_always_wins_over_name() {
        let registry = ScenarioRegistry::with_builtins();
        let scenario = registry.create("simple", Some("test.widgets"));
        assert_eq!(scenario.describe().name, "dynamic");
    }

    #[test]
    fn custom_name_with_no_table_selects_dynamic_for_auto_discovery() {
        let registry = ScenarioRegistry::with_builtins();
        let scenario = registry.create("custom", None);
        assert_eq!(scenario.describe().name, "dynamic");
        assert_eq!(scenario.describe().table_name, "");
    }

    #[test]
    fn dynamic_name_with_no_table_also_selects_dynamic() {
        let registry = ScenarioRegistry::with_builtins();
        let scenario = registry.create("dynamic", None);
        assert_eq!(scenario.describe().name, "dynamic");
    }

    #[test]
    fn describe_all_ends_with_synthetic_custom_entry() {
        let registry = ScenarioRegistry::with_builtins();
        let descriptions = registry.describe_all();
        assert_eq!(descriptions.last().unwrap().name, "custom");
    }
}
