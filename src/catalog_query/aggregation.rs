//! Date grouping and insight aggregations
//!
//! All functions are pure: same input, same output, no clock access.

use crate::event_store::Event;
use crate::models::{Category, VerificationTier};
use chrono::{NaiveDate, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default number of hours reported by [`popular_times`]
pub const DEFAULT_TOP_N: usize = 3;

/// Bucket events by date. Buckets iterate in ascending date order;
/// events inside a bucket keep their input order.
pub fn group_by_date<'a>(events: &[&'a Event]) -> BTreeMap<NaiveDate, Vec<&'a Event>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&'a Event>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.date).or_default().push(*event);
    }
    grouped
}

/// Most common start hours as 12-hour labels, busiest first.
///
/// Events without a time are ignored, and so are events in hour 0
/// (`00:xx`).
/// Equal counts are ordered by ascending hour.
pub fn popular_times<'a, I>(events: I, top_n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
    for event in events {
        if let Some(time) = event.time {
            let hour = time.hour();
            if hour == 0 {
                continue;
            }
            *hours.entry(hour).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(u32, usize)> = hours.into_iter().collect();
    // stable: ties stay in ascending hour order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(hour, _)| hour_label(hour))
        .collect()
}

/// `13 -> "1:00 PM"`, `9 -> "9:00 AM"`, `0 -> "12:00 AM"`.
///
/// Hour 12 renders as `"12:00 AM"`: only hours above 12 get the PM suffix.
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12:00 AM".to_string(),
        h if h > 12 => format!("{}:00 PM", h - 12),
        h => format!("{}:00 AM", h),
    }
}

/// Count and share of one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryShare {
    pub count: usize,
    /// 0..=100; 0 when there are no events
    pub percentage: f64,
}

/// Share of every category (all seven present)
pub fn category_distribution<'a, I>(events: I) -> BTreeMap<Category, CategoryShare>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    let mut total = 0usize;
    for event in events {
        *counts.entry(event.category).or_insert(0) += 1;
        total += 1;
    }

    counts
        .into_iter()
        .map(|(category, count)| {
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            (category, CategoryShare { count, percentage })
        })
        .collect()
}

/// Data behind the insights view
#[derive(Debug, Clone, Serialize)]
pub struct InsightsSummary {
    pub total_events: usize,
    pub official_events: usize,
    pub category_count: usize,
    pub popular_times: Vec<String>,
    pub distribution: BTreeMap<Category, CategoryShare>,
}

/// Build the insights summary over `events`
pub fn insights(events: &[Event], top_n: usize) -> InsightsSummary {
    InsightsSummary {
        total_events: events.len(),
        official_events: events
            .iter()
            .filter(|e| e.verification_tier == VerificationTier::Official)
            .count(),
        category_count: Category::ALL.len(),
        popular_times: popular_times(events, top_n),
        distribution: category_distribution(events),
    }
}
