//! Search, ordering and aggregation over receipt collections.
//!
//! Every operation here is a pure function of an in-memory snapshot,
//! usually the result of [`ReceiptStore::list_all`](crate::store::ReceiptStore::list_all).

pub mod aggregate;
pub mod ordering;
pub mod query;

pub use aggregate::{aggregate, time_series, top_vendors, Granularity, Insights, SpendSummary};
pub use ordering::{sort_receipts, SortKey, SortOrder, SortValue};
pub use query::{
    filter_by_amount_range, filter_by_date_range, filter_by_substring, KeywordFilter, SearchField,
    SearchQuery,
};
