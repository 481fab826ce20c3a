//! Query construction module
//!
//! Builds SOQL strings from an object name, a field list, optional
//! membership conditions and an optional last-modified window.
//!
//! # Example
//!
//! ```rust
//! use crm_extract::query::QuerySpec;
//! use crm_extract::types::Conditions;
//!
//! let soql = QuerySpec::new("Case", ["Id", "Status"])
//!     .with_conditions(Conditions::new().with("Status", ["Open", "Pending"]))
//!     .build();
//! assert_eq!(soql, "SELECT Id, Status FROM Case WHERE Status IN ('Open', 'Pending')");
//! ```

mod constructor;

pub use constructor::{
    build_query, format_datetime, select_clause, where_clause, QuerySpec, COMPOUND_FIELDS,
    LAST_MODIFIED_FIELD, SOQL_DATETIME_FORMAT,
};
