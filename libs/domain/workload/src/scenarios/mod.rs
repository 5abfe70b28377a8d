mod common;
mod dynamic;
mod foreign_key_join;
mod jsonb;
mod simple;
mod wide;

pub use dynamic::DynamicScenario;
pub use foreign_key_join::ForeignKeyJoinScenario;
pub use jsonb::JsonbScenario;
pub use simple::SimpleScenario;
pub use wide::WideScenario;
