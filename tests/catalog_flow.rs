//! End-to-end catalog flow against a scripted extraction service

use approx::assert_relative_eq;
use async_trait::async_trait;
use campus_events::account_store::RegisterRequest;
use campus_events::catalog_query::popular_times;
use campus_events::flyer_extraction::{
    ExtractionCollaborator, ExtractionRejection, ExtractionRequest, FlyerSource, TransportError,
};
use campus_events::models::{Category, FilterValue, VerificationTier, View};
use campus_events::user_api::{self, ViewModel};
use campus_events::{AppConfig, AppState, Error};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

struct ScriptedService {
    replies: Mutex<VecDeque<std::result::Result<String, TransportError>>>,
    seen_media_types: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn new(replies: Vec<std::result::Result<String, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen_media_types: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ExtractionCollaborator for ScriptedService {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> std::result::Result<String, TransportError> {
        self.seen_media_types
            .lock()
            .unwrap()
            .push(request.image.media_type.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Envelope("no scripted reply".to_string())))
    }
}

fn png_flyer() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
    file
}

#[tokio::test]
async fn club_scans_flyer_and_student_cannot_delete_it() {
    let service = ScriptedService::new(vec![
        Err(TransportError::Status {
            status: 529,
            body: "overloaded".to_string(),
        }),
        Ok("```json\n{\"title\":\"Hack Night\",\"date\":\"2025-10-29\",\"time\":\"18:30\",\"location\":\"CS Lab\",\"description\":\"Pizza and projects\",\"category\":\"Academic\"}\n```".to_string()),
    ]);
    let state = AppState::new(AppConfig::default(), service.clone());
    state.seed_samples().await;

    user_api::register(
        &state,
        RegisterRequest::club("acm", "pw", "acm@campus.edu", "ACM Chapter"),
    )
    .await
    .unwrap();
    state.accounts.set_verified("acm", true).await.unwrap();
    user_api::login(&state, "acm", "pw").await.unwrap();

    let flyer = png_flyer();
    let source = FlyerSource::File(flyer.path().to_path_buf());

    // First attempt fails in transport; the caller retries
    let err = user_api::create_event_from_flyer(&state, source.clone())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionRejection::TransportFailure { .. })
    ));
    assert_eq!(err.to_failure().error_code, "EXTRACTION_TRANSPORT");

    let draft = user_api::create_event_from_flyer(&state, source).await.unwrap();
    assert_eq!(draft.verification_tier, Some(VerificationTier::Official));
    let event = user_api::submit_draft(&state).await.unwrap();
    assert_eq!(event.verification_tier, VerificationTier::Official);
    assert_eq!(event.category, Category::Academic);
    assert_eq!(
        *service.seen_media_types.lock().unwrap(),
        vec!["image/png".to_string(), "image/png".to_string()]
    );

    user_api::logout(&state).await;
    user_api::register(&state, RegisterRequest::student("sam", "pw", "sam@campus.edu"))
        .await
        .unwrap();
    user_api::login(&state, "sam", "pw").await.unwrap();
    assert!(matches!(
        user_api::delete_event(&state, event.id).await,
        Err(Error::Unauthorized(_))
    ));
    user_api::report_event(&state, event.id).await.unwrap();

    user_api::set_filter(&state, FilterValue::Verification(VerificationTier::Official), true).await;
    let official = user_api::list_events(&state).await;
    assert_eq!(official.len(), 3);
    assert_eq!(official.last().unwrap().flag_count, 1);

    user_api::select_view(&state, View::Insights).await;
    let ViewModel::Insights(summary) = user_api::current_view(&state).await else {
        panic!("expected insights view");
    };
    assert_eq!(summary.total_events, 4);
    assert_eq!(summary.official_events, 3);
    let total: f64 = summary.distribution.values().map(|s| s.percentage).sum();
    assert_relative_eq!(total, 100.0, epsilon = 1e-9);
    assert_relative_eq!(summary.distribution[&Category::Academic].percentage, 25.0);
}

#[tokio::test]
async fn unverified_club_posts_as_student() {
    let state = AppState::new(AppConfig::default(), ScriptedService::new(Vec::new()));
    user_api::register(
        &state,
        RegisterRequest::club("newclub", "pw", "c@campus.edu", "Board Games"),
    )
    .await
    .unwrap();
    user_api::login(&state, "newclub", "pw").await.unwrap();

    user_api::update_draft(&state, |d| {
        d.title = "Catan Tournament".to_string();
        d.date = "2025-11-12".to_string();
        d.time = "TBD".to_string();
        d.category = Category::Social;
    })
    .await;
    let event = user_api::submit_draft(&state).await.unwrap();
    assert_eq!(event.verification_tier, VerificationTier::StudentPosted);
    assert!(event.time.is_none());
}

#[tokio::test]
async fn popular_times_scenario() {
    let state = AppState::new(AppConfig::default(), ScriptedService::new(Vec::new()));
    user_api::register(&state, RegisterRequest::student("kim", "pw", "k@campus.edu"))
        .await
        .unwrap();
    user_api::login(&state, "kim", "pw").await.unwrap();

    for (title, time) in [("A", "18:00"), ("B", "18:15"), ("C", "14:00"), ("D", "00:30")] {
        user_api::update_draft(&state, |d| {
            d.title = title.to_string();
            d.date = "2025-11-20".to_string();
            d.time = time.to_string();
        })
        .await;
        user_api::submit_draft(&state).await.unwrap();
    }

    let events = user_api::list_events(&state).await;
    assert_eq!(popular_times(&events, 3), vec!["6:00 PM", "2:00 PM"]);

    user_api::select_view(&state, View::Calendar).await;
    let ViewModel::Calendar(buckets) = user_api::current_view(&state).await else {
        panic!("expected calendar view");
    };
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets.values().next().unwrap().len(), 4);
}
