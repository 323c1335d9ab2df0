pub mod joins;
pub mod mapping;
pub mod operators;
pub mod query;
pub mod values;

pub use self::joins::JoinSpec;
pub use self::mapping::{MappingRule, MappingType};
pub use self::operators::JoinKind;
pub use self::query::QueryDescription;
pub use self::values::{Row, SqlValue};
