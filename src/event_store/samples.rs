//! Seed catalog shown before anyone posts

use super::types::NewEvent;
use crate::models::{AccountKind, Category, Eligibility, VerificationTier};
use chrono::{NaiveDate, NaiveTime};

/// Account name the seed events are attributed to
pub const SEED_ACCOUNT: &str = "campus-events";

fn seed(
    title: &str,
    (y, m, d): (i32, u32, u32),
    hour: u32,
    location: &str,
    category: Category,
    verification_tier: VerificationTier,
    description: &str,
) -> NewEvent {
    let account_type = match verification_tier {
        VerificationTier::Official => AccountKind::Club,
        _ => AccountKind::Student,
    };
    NewEvent {
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        time: NaiveTime::from_hms_opt(hour, 0, 0),
        location: location.to_string(),
        description: description.to_string(),
        category,
        eligibility: Eligibility::AllStudents,
        verification_tier,
        created_by: SEED_ACCOUNT.to_string(),
        account_type,
        flyer_image: None,
    }
}

/// The three launch events
pub fn sample_events() -> Vec<NewEvent> {
    vec![
        seed(
            "International Food Festival",
            (2025, 10, 28),
            18,
            "Student Union",
            Category::Cultural,
            VerificationTier::Official,
            "Celebrate diverse cultures through food from around the world",
        ),
        seed(
            "Tech Career Fair",
            (2025, 10, 30),
            14,
            "Career Center",
            Category::Professional,
            VerificationTier::Official,
            "Meet recruiters from top tech companies",
        ),
        seed(
            "Open Mic Night",
            (2025, 10, 26),
            20,
            "Coffee House",
            Category::Arts,
            VerificationTier::StudentPosted,
            "Showcase your talent - music, poetry, comedy welcome",
        ),
    ]
}
