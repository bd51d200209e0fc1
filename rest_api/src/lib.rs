// rest_api/src/lib.rs
//! HTTP surface of the hospital backend: router, handlers, bearer-auth
//! extractors and error mapping.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use lib::{Database, DatabaseConfig};
use security::Authenticator;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;

pub use crate::config::{load_rest_api_config, RestApiConfig};
pub use crate::errors::RestApiError;

use crate::handlers::{appointments, doctors, patients, stats, users};

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(db: Arc<Database>, auth: Authenticator) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check_handler))
        .route("/users/login", post(users::login))
        .route("/users/me", get(users::current_user))
        .route("/users/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/users/:id",
            patch(users::update_user).delete(users::delete_user),
        )
        .route("/doctors", get(doctors::list_doctors).post(doctors::create_doctor))
        .route("/doctors/search", get(doctors::search_doctors))
        .route("/doctors/specialty/:specialty", get(doctors::doctors_by_specialty))
        .route(
            "/doctors/:id",
            get(doctors::get_doctor)
                .patch(doctors::update_doctor)
                .delete(doctors::delete_doctor),
        )
        .route("/doctors/:id/slots", put(doctors::update_doctor_slots))
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route("/patients/search", get(patients::search_patients))
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .patch(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route("/appointments/recent", get(appointments::recent_appointments))
        .route("/appointments/upcoming", get(appointments::upcoming_appointments))
        .route("/appointments/date/:date", get(appointments::appointments_by_date))
        .route(
            "/appointments/doctor/:doctor_id",
            get(appointments::appointments_by_doctor),
        )
        .route(
            "/appointments/patient/:patient_id",
            get(appointments::appointments_by_patient),
        )
        .route(
            "/appointments/:id",
            get(appointments::get_appointment)
                .patch(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            "/appointments/:id/status",
            patch(appointments::update_appointment_status),
        )
        .route("/stats", get(stats::get_stats))
}

/// Builds the full application router. Unknown routes answer 404 `{error}`.
pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Router {
    let mut router = Router::new()
        .nest("/api", api_routes())
        .fallback(handlers::not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true);
        router = router.layer(cors);
    }
    router
}

/// Opens the database, serves the API until `shutdown` resolves, then flushes.
pub async fn start_server<F>(config: RestApiConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let db_config = DatabaseConfig {
        data_directory: config.database_path.clone().into(),
        bcrypt_cost: config.bcrypt_cost,
    };
    let db = Arc::new(
        Database::open(&db_config)
            .with_context(|| format!("Failed to open database at {}", config.database_path))?,
    );
    let auth = Authenticator::new(&config.jwt_secret, config.token_ttl_hours);
    let app = build_router(AppState::new(db.clone(), auth), Some(&config.cors_origin));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed to start or run")?;

    db.flush().await.context("Failed to flush database on shutdown")?;
    info!("REST API server stopped.");
    Ok(())
}
