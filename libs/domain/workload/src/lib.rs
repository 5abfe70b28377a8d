//! Pluggable scenario contract: turns a declared workload shape into
//! two executable operations (read, write) against a live connection,
//! including table introspection for the dynamic case.

mod column;
mod error;
mod id_source;
mod registry;
mod scenario;
mod scenarios;
mod value_gen;

pub use column::ColumnDescriptor;
pub use error::WorkloadError;
pub use id_source::{IdSource, CACHE_CAPACITY};
pub use registry::ScenarioRegistry;
pub use scenario::{Scenario, ScenarioDescription};
pub use scenarios::{DynamicScenario, ForeignKeyJoinScenario, JsonbScenario, SimpleScenario, WideScenario};
