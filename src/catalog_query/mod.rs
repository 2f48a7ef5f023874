//! CatalogQuery - Filter & Aggregation Engine
//!
//! ## Responsibilities
//!
//! - Filtered views over the event collection
//! - Date buckets for the calendar view
//! - Popular start hours and category distribution for insights
//!
//! Everything here is synchronous and side-effect free, so a render loop
//! may call it as often as it likes.

mod aggregation;
mod filter;

pub use aggregation::{
    category_distribution, group_by_date, hour_label, insights, popular_times, CategoryShare,
    InsightsSummary, DEFAULT_TOP_N,
};
pub use filter::{filter_events, FilterSelection};
