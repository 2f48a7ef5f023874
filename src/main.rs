//! Campus Events - command-line front end
//!
//! Loads the sample catalog, optionally signs in and scans a flyer, then
//! prints the requested view as JSON.

use campus_events::{
    account_store::RegisterRequest,
    flyer_extraction::FlyerSource,
    models::View,
    user_api,
    AppConfig, AppState,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "campus-events")]
#[command(about = "Campus event catalog with flyer scanning")]
struct Args {
    /// Flyer image to scan into a draft (requires --username/--password)
    #[arg(long)]
    flyer: Option<PathBuf>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Register the student account before logging in
    #[arg(long)]
    register: bool,

    /// Commit the scanned draft to the catalog
    #[arg(long)]
    submit: bool,

    /// View to print: calendar, list or insights
    #[arg(long, default_value = "insights")]
    view: String,
}

fn parse_view(s: &str) -> anyhow::Result<View> {
    match s {
        "calendar" => Ok(View::Calendar),
        "list" => Ok(View::List),
        "insights" => Ok(View::Insights),
        other => anyhow::bail!("unknown view: {} (expected calendar, list or insights)", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_events=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Campus Events v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let view = parse_view(&args.view)?;

    let config = AppConfig::default();
    tracing::info!(
        extraction_api_url = %config.extraction_api_url,
        extraction_model = %config.extraction_model,
        timeout_secs = config.extraction_timeout.as_secs(),
        api_key_set = config.extraction_api_key.is_some(),
        "Configuration loaded"
    );

    let state = AppState::from_config(config)?;
    state.seed_samples().await;

    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        if args.register {
            let email = format!("{}@campus.edu", username);
            if let Err(e) =
                user_api::register(&state, RegisterRequest::student(username, password, &email)).await
            {
                println!("{}", serde_json::to_string_pretty(&e.to_failure())?);
            }
        }
        if let Err(e) = user_api::login(&state, username, password).await {
            println!("{}", serde_json::to_string_pretty(&e.to_failure())?);
        }
    }

    if let Some(path) = args.flyer {
        match user_api::create_event_from_flyer(&state, FlyerSource::File(path)).await {
            Ok(draft) => {
                println!("{}", serde_json::to_string_pretty(&draft)?);
                if args.submit {
                    match user_api::submit_draft(&state).await {
                        Ok(event) => tracing::info!(event_id = event.id, "Draft submitted"),
                        Err(e) => println!("{}", serde_json::to_string_pretty(&e.to_failure())?),
                    }
                }
            }
            Err(e) => println!("{}", serde_json::to_string_pretty(&e.to_failure())?),
        }
    }

    user_api::select_view(&state, view).await;
    let model = user_api::current_view(&state).await;
    println!("{}", serde_json::to_string_pretty(&model)?);

    Ok(())
}
