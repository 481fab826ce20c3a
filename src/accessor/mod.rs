//! Record accessor module
//!
//! A [`RecordAccessor`] is bound to one remote object. It picks the
//! retrieval strategy for a [`RecordRequest`]:
//!
//! - nothing set: full export through Bulk API 2.0 into
//!   `<root>/all_records/<Object>/all_records2.{json,csv}`
//! - with a date window: Bulk API 1.0 into
//!   `<root>/<Object>/by_date/from_<start>_to_<end>_data.{json,csv}`
//! - otherwise: Bulk API 1.0 into
//!   `<root>/<Object>/queries/<YYYY-MM-DD>_query_results.{json,csv}`

mod record_accessor;
mod types;

pub use record_accessor::{timestamp_literal, RecordAccessor, ALL_RECORDS_NAME};
pub use types::RecordRequest;
