use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use admin_cell::{AdminState, CatalogService};
use booking_wizard_cell::{sink_from_config, BookingService, SlotCalendar};
use shared_config::AppConfig;
use shared_utils::clock::{Clock, SystemClock};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinic Booking API server");

    // Load configuration
    let config = AppConfig::from_env();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Admin catalog
    let catalog = CatalogService::from_config(&config)
        .await
        .context("loading clinic records")?;
    let admin = Arc::new(AdminState::new(catalog, clock.clone()));

    // Booking wizard sessions
    let calendar = SlotCalendar::from_config(&config)
        .await
        .context("loading slot calendar")?;
    let sink = sink_from_config(&config).context("configuring booking submission")?;
    let booking = Arc::new(
        BookingService::new(Arc::new(calendar), sink, clock)
            .with_idle_ttl(Duration::from_secs(config.session_idle_ttl_secs))
            .with_submission_deadline(Duration::from_secs(config.booking_submission_timeout_secs + 5)),
    );

    // Sweep idle booking sessions in the background
    let sweep_every = booking.idle_ttl().min(SESSION_SWEEP_INTERVAL);
    tokio::spawn({
        let booking = booking.clone();
        async move {
            let mut ticker = tokio::time::interval(sweep_every);
            loop {
                ticker.tick().await;
                booking.evict_idle().await;
            }
        }
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(admin, booking)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
