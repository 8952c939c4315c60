//! Reconciliation core: matching, diffing and write-plan construction,
//! plus the small pieces of business logic it leans on (month tokens, name
//! splitting, field comparison, history text).

pub mod compare;
pub mod engine;
pub mod executor;
pub mod history;
pub mod month;
pub mod name;
pub mod plan;
pub mod row;
pub mod table;
pub mod tables;
pub mod value;

pub use engine::Reconciler;
pub use executor::WriteExecutor;
pub use row::SourceRow;
pub use table::{SheetLayout, TableSpec};
pub use value::Value;
