/// Web server example wiring otpbase into an HTTP router.
///
/// Routes:
/// - `POST /`            SMS webhook (form fields `Body` and `From`)
/// - `GET /`             Retained codes, newest first, one per line (`?raw=true` for full texts)
/// - `GET /apps`         Current TOTP code of every registered application
/// - `POST /apps`        Register an application (JSON `{"name": .., "secret": ..}`)
/// - `DELETE /apps/:name` Remove an application
///
/// Run with `cargo run --example web`, then for instance:
///
/// ```bash
/// curl -d 'Body=Your code is 482913' -d 'From=+15550199' localhost:8092/
/// curl localhost:8092/
/// curl -H 'content-type: application/json' \
///      -d '{"name":"work","secret":"JBSWY3DPEHPK3PXP"}' localhost:8092/apps
/// curl localhost:8092/apps
/// ```
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use otpbase::storage::MemoryStore;
use otpbase::{AddOutcome, AppRegistry, ExpirySweeper, OtpConfig, OtpError, SmsInbox};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    inbox: Arc<SmsInbox>,
    registry: Arc<AppRegistry<MemoryStore>>,
}

#[derive(Deserialize)]
struct InboundSms {
    #[serde(rename = "Body", default)]
    body: String,
    #[serde(rename = "From")]
    from: Option<String>,
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    raw: bool,
}

#[derive(Deserialize)]
struct Registration {
    #[serde(default)]
    name: String,
    #[serde(default)]
    secret: String,
}

#[derive(Serialize)]
struct CodesResponse {
    seconds_remaining: u64,
    apps: Vec<otpbase::AppCode>,
}

struct ApiError(OtpError);

impl From<OtpError> for ApiError {
    fn from(e: OtpError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OtpError::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

async fn receive_sms(
    State(state): State<AppState>,
    Form(sms): Form<InboundSms>,
) -> Result<Response, ApiError> {
    match state.inbox.add(&sms.body, sms.from.as_deref()).await? {
        AddOutcome::Accepted => Ok(StatusCode::NO_CONTENT.into_response()),
        AddOutcome::Forward(relay) => {
            Ok(([(header::CONTENT_TYPE, "application/xml")], relay.twiml()).into_response())
        }
    }
}

async fn list_codes(State(state): State<AppState>, Query(query): Query<ListQuery>) -> String {
    state
        .inbox
        .list(!query.raw)
        .await
        .into_iter()
        .map(|line| line + "\n")
        .collect()
}

async fn app_codes(State(state): State<AppState>) -> Result<Json<CodesResponse>, ApiError> {
    Ok(Json(CodesResponse {
        seconds_remaining: state.registry.seconds_remaining()?,
        apps: state.registry.codes().await?,
    }))
}

async fn register_app(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .register(&registration.name, &registration.secret)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn remove_app(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.remove(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = OtpConfig::default();
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }
    tracing::info!("{}", config.summary());

    let inbox = Arc::new(SmsInbox::from_config(&config));
    let registry = Arc::new(AppRegistry::new(Arc::new(MemoryStore::new())));
    registry.init().await?;

    let sweeper = ExpirySweeper::from_config(&config).spawn(Arc::clone(&inbox));

    let state = AppState { inbox, registry };
    let app = Router::new()
        .route("/", get(list_codes).post(receive_sms))
        .route("/apps", get(app_codes).post(register_app))
        .route("/apps/:name", delete(remove_app))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port: u16 = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => 8092,
    };
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    println!("Server running on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    sweeper.stop().await;
    Ok(())
}
