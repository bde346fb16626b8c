pub mod model;

pub use model::{FinancialStatements, StatementField, REQUIRED_FIELDS};
