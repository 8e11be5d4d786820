//! Client-side list filtering.
//!
//! List views fetch a full collection and narrow it in memory. The filter
//! state is a loosely-typed nested object with three optional namespaces:
//!
//! ```text
//! {
//!   "textField": { "inputValue": "john" },
//!   "dropDown":  { "roleId": 2, "statusId": [1, 3] },
//!   "dateRange": { "start": "2024-01-01", "end": "2024-03-31" }
//! }
//! ```
//!
//! A missing or empty namespace never narrows the list.

mod evaluate;
mod state;
mod tally;

pub use evaluate::{FilterOptions, filter_records, filter_records_with};
pub use state::{DateRange, FilterSnapshot, FilterState, is_falsy, parse_date};
pub use tally::{UNSPECIFIED, count_by};
