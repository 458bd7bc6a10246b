//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use xsession_domain::{
    Player, Property, Session, SessionContext, SessionId, SessionReport, TitleId, Xuid,
};

use crate::app::App;
use crate::use_cases::{AggregateError, PresenceUpdate, RegistryError, SessionPropertyError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/sessions/report", get(session_report))
        .route("/api/sessions", post(upsert_session))
        .route("/api/players", post(upsert_player))
        .route("/api/players/presence", post(update_presences))
        .route(
            "/title/{title_id}/sessions/{session_id}/properties",
            get(list_properties).post(add_properties),
        )
        .route(
            "/title/{title_id}/sessions/{session_id}/context",
            get(get_contexts).post(set_contexts),
        )
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Report
// =============================================================================

async fn session_report(State(app): State<Arc<App>>) -> Result<Json<SessionReport>, ApiError> {
    let report = app.use_cases.aggregate.execute().await?;

    let stats = app.title_metadata.cache_stats();
    tracing::debug!(
        catalogs = stats.catalogs,
        icons = stats.icons,
        infos = stats.infos,
        cached_titles = ?app.title_metadata.cached_title_ids(),
        "Title metadata cache"
    );

    Ok(Json(report))
}

// =============================================================================
// Registration
// =============================================================================

/// Session as posted by the session service.
///
/// Properties arrive as raw base64 records; malformed ones are dropped with a
/// warning instead of failing the whole session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest {
    #[serde(alias = "sessionId")]
    id: SessionId,
    title_id: TitleId,
    #[serde(default)]
    xuid: Option<Xuid>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    media_id: String,
    #[serde(default)]
    version: u32,
    #[serde(default)]
    public_slots_count: u32,
    #[serde(default)]
    private_slots_count: u32,
    #[serde(default)]
    players: Vec<Xuid>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    contexts: Vec<SessionContext>,
    #[serde(default)]
    properties: Vec<String>,
}

impl SessionRequest {
    fn into_session(self) -> Session {
        let mut session = Session::new(self.id, self.title_id);
        session.xuid = self.xuid;
        session.title = self.title;
        session.media_id = self.media_id;
        session.version = self.version;
        session.public_slots_count = self.public_slots_count;
        session.private_slots_count = self.private_slots_count;
        session.set_players(self.players);
        session.deleted = self.deleted;
        session.set_contexts(self.contexts);

        let properties = self
            .properties
            .iter()
            .filter_map(|raw| match Property::decode(raw) {
                Ok(property) => Some(property),
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.id,
                        error = %e,
                        "Skipping malformed session property"
                    );
                    None
                }
            })
            .collect::<Vec<_>>();
        session.add_properties(properties);
        session
    }
}

async fn upsert_session(
    State(app): State<Arc<App>>,
    Json(request): Json<SessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = app
        .use_cases
        .registry
        .upsert_session(request.into_session())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn upsert_player(
    State(app): State<Arc<App>>,
    Json(player): Json<Player>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let player = app.use_cases.registry.upsert_player(player).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Batch of presence reports; fields other than these two are ignored.
#[derive(Debug, Deserialize)]
struct PresencesRequest {
    presence: Vec<PresenceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresenceEntry {
    xuid: Xuid,
    #[serde(default)]
    rich_presence: String,
}

async fn update_presences(
    State(app): State<Arc<App>>,
    Json(request): Json<PresencesRequest>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let updates = request
        .presence
        .into_iter()
        .map(|entry| PresenceUpdate {
            xuid: entry.xuid,
            rich_presence: entry.rich_presence,
        })
        .collect();
    let players = app.use_cases.registry.update_presences(updates).await?;
    Ok(Json(players))
}

// =============================================================================
// Properties & Contexts
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertyView {
    id: String,
    name: &'static str,
    #[serde(rename = "type")]
    type_name: &'static str,
    size: usize,
    value: String,
    system: bool,
    base64: String,
    description: String,
}

impl From<&Property> for PropertyView {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id_string(),
            name: property.friendly_name(),
            type_name: property.type_name(),
            size: property.byte_size(),
            value: property.display_value(),
            system: property.is_system(),
            base64: property.as_base64().to_string(),
            description: property.describe(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddPropertiesRequest {
    properties: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SetContextsRequest {
    contexts: Vec<SessionContext>,
}

#[derive(Debug, Serialize)]
struct ContextsResponse {
    context: Vec<String>,
}

async fn list_properties(
    State(app): State<Arc<App>>,
    Path((title_id, session_id)): Path<(String, String)>,
) -> Result<Json<Vec<PropertyView>>, ApiError> {
    let (title_id, session_id) = parse_session_path(&title_id, &session_id)?;
    let properties = app
        .use_cases
        .session_properties
        .list_properties(title_id, session_id)
        .await?;
    Ok(Json(properties.iter().map(PropertyView::from).collect()))
}

async fn add_properties(
    State(app): State<Arc<App>>,
    Path((title_id, session_id)): Path<(String, String)>,
    Json(request): Json<AddPropertiesRequest>,
) -> Result<Json<Vec<PropertyView>>, ApiError> {
    let (title_id, session_id) = parse_session_path(&title_id, &session_id)?;
    let session = app
        .use_cases
        .session_properties
        .add_properties(title_id, session_id, &request.properties)
        .await?;
    Ok(Json(session.properties.iter().map(PropertyView::from).collect()))
}

async fn get_contexts(
    State(app): State<Arc<App>>,
    Path((title_id, session_id)): Path<(String, String)>,
) -> Result<Json<ContextsResponse>, ApiError> {
    let (title_id, session_id) = parse_session_path(&title_id, &session_id)?;
    let context = app
        .use_cases
        .session_properties
        .encoded_contexts(title_id, session_id)
        .await?;
    Ok(Json(ContextsResponse { context }))
}

async fn set_contexts(
    State(app): State<Arc<App>>,
    Path((title_id, session_id)): Path<(String, String)>,
    Json(request): Json<SetContextsRequest>,
) -> Result<Json<Vec<SessionContext>>, ApiError> {
    let (title_id, session_id) = parse_session_path(&title_id, &session_id)?;
    let session = app
        .use_cases
        .session_properties
        .set_contexts(title_id, session_id, request.contexts)
        .await?;
    Ok(Json(session.contexts))
}

fn parse_session_path(title_id: &str, session_id: &str) -> Result<(TitleId, SessionId), ApiError> {
    let title_id = TitleId::parse(title_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let session_id =
        SessionId::parse(session_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok((title_id, session_id))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<AggregateError> for ApiError {
    fn from(e: AggregateError) -> Self {
        match e {
            AggregateError::Repo(e) => e.into(),
        }
    }
}

impl From<SessionPropertyError> for ApiError {
    fn from(e: SessionPropertyError) -> Self {
        match e {
            SessionPropertyError::SessionNotFound { .. } => ApiError::NotFound,
            SessionPropertyError::MalformedProperty { .. } => ApiError::BadRequest(e.to_string()),
            SessionPropertyError::Repo(e) => e.into(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Invalid(e) => ApiError::BadRequest(e.to_string()),
            RegistryError::Repo(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        app_settings::AppSettings,
        in_memory::{InMemoryPlayerRepo, InMemorySessionRepo},
        profanity::WordListFilter,
        title_metadata::TitleMetadataService,
    };
    use axum::{body::Body, http::Request as HttpRequest};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use xsession_domain::keys;

    fn test_app() -> Router {
        let settings = AppSettings::from_lookup(|key| match key {
            "HEROKU_BUILD_COMMIT" => Some("abc123".to_string()),
            _ => None,
        });
        let app = App::new(
            &settings,
            Arc::new(InMemorySessionRepo::new()),
            Arc::new(InMemoryPlayerRepo::new()),
            Arc::new(TitleMetadataService::new(vec![], vec![], vec![])),
            Arc::new(WordListFilter::default()),
        );
        routes().with_state(Arc::new(app))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = HttpRequest::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn session_body() -> Value {
        json!({
            "id": "AABBCCDD00112233",
            "titleId": "4D5307E6",
            "xuid": "0009000000000001",
            "mediaId": "media-1",
            "version": 2,
            "publicSlotsCount": 8,
            "privateSlotsCount": 2,
            "players": ["0009000000000001", "0009000000000002"],
            "properties": [
                Property::encode_context(keys::CONTEXT_GAME_MODE, 1),
                "garbage"
            ]
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = test_app()
            .oneshot(HttpRequest::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn report_groups_registered_sessions() {
        let router = test_app();

        let (status, _) = send(
            &router,
            "POST",
            "/api/players",
            Some(json!({ "xuid": "0009000000000001", "gamertag": "Chief" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, saved) = send(&router, "POST", "/api/sessions", Some(session_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["properties"].as_array().map(Vec::len), Some(1));

        let (status, report) = send(&router, "GET", "/api/sessions/report", None).await;
        assert_eq!(status, StatusCode::OK);

        let title = &report["Titles"][0];
        assert_eq!(title["titleId"], "4D5307E6");
        assert_eq!(title["name"], "");
        assert_eq!(title["icon"], "");
        assert!(title.get("info").is_none());

        let session = &title["sessions"][0];
        assert_eq!(session["mediaId"], "media-1");
        assert_eq!(session["total"], 10);
        assert_eq!(session["host_gamertag"], "Chief");
        assert_eq!(session["host_presence"], "Playing ");
        assert_eq!(session["host_xuid"], "0009000000000001");
        assert_eq!(session["players"], json!(["Chief", "Local Player 1"]));

        assert_eq!(report["Metadata"]["HEROKU_BUILD_COMMIT"], "abc123");
        assert!(report["Metadata"]["START_TIME"].is_string());
    }

    #[tokio::test]
    async fn repeated_participants_are_stored_once() {
        let router = test_app();
        send(
            &router,
            "POST",
            "/api/players",
            Some(json!({ "xuid": "0009000000000002", "gamertag": "Alice" })),
        )
        .await;

        let mut body = session_body();
        body["xuid"] = Value::Null;
        body["players"] = json!(["0009000000000002", "0009000000000002"]);
        let (status, saved) = send(&router, "POST", "/api/sessions", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["players"], json!(["0009000000000002"]));

        let (_, report) = send(&router, "GET", "/api/sessions/report", None).await;
        let session = &report["Titles"][0]["sessions"][0];
        assert_eq!(session["host_gamertag"], "Alice");
        assert_eq!(session["players"], json!(["Alice"]));
    }

    #[tokio::test]
    async fn reported_presence_shows_up_as_host_presence() {
        let router = test_app();
        send(
            &router,
            "POST",
            "/api/players",
            Some(json!({ "xuid": "0009000000000001", "gamertag": "Chief" })),
        )
        .await;

        let (status, updated) = send(
            &router,
            "POST",
            "/api/players/presence",
            Some(json!({
                "presence": [
                    {
                        "xuid": "0009000000000001",
                        "state": 1,
                        "sessionID": "AABBCCDD00112233",
                        "titleID": "4D5307E6",
                        "userTime": 0,
                        "richPresence": "Slayer on Guardian",
                        "richPresenceSize": 18
                    },
                    { "xuid": "0009000000000009", "richPresence": "Menus" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated.as_array().map(Vec::len), Some(1));

        send(&router, "POST", "/api/sessions", Some(session_body())).await;
        let (_, report) = send(&router, "GET", "/api/sessions/report", None).await;
        assert_eq!(
            report["Titles"][0]["sessions"][0]["host_presence"],
            "Slayer on Guardian"
        );
    }

    #[tokio::test]
    async fn properties_round_trip_over_http() {
        let router = test_app();
        send(&router, "POST", "/api/sessions", Some(session_body())).await;

        let uri = "/title/4D5307E6/sessions/AABBCCDD00112233/properties";
        let (status, added) = send(
            &router,
            "POST",
            uri,
            Some(json!({ "properties": [Property::encode_context(keys::CONTEXT_GAME_TYPE, 0)] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(added.as_array().map(Vec::len), Some(2));

        let (status, listed) = send(&router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["id"], "0000800B");
        assert_eq!(listed[0]["type"], "Context");
        assert_eq!(listed[0]["system"], true);
        assert!(listed[0]["description"]
            .as_str()
            .is_some_and(|d| d.starts_with("Context ID:")));
    }

    #[tokio::test]
    async fn malformed_property_is_a_bad_request() {
        let router = test_app();
        send(&router, "POST", "/api/sessions", Some(session_body())).await;

        let (status, _) = send(
            &router,
            "POST",
            "/title/4D5307E6/sessions/AABBCCDD00112233/properties",
            Some(json!({ "properties": ["AAAA="] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn contexts_are_stored_and_encoded() {
        let router = test_app();
        send(&router, "POST", "/api/sessions", Some(session_body())).await;

        let uri = "/title/4D5307E6/sessions/AABBCCDD00112233/context";
        let (status, _) = send(
            &router,
            "POST",
            uri,
            Some(json!({ "contexts": [{ "contextId": keys::CONTEXT_GAME_MODE, "value": 3 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["context"],
            json!([Property::encode_context(keys::CONTEXT_GAME_MODE, 3)])
        );
    }

    #[tokio::test]
    async fn unknown_sessions_and_bad_ids_are_rejected() {
        let router = test_app();

        let (status, _) = send(
            &router,
            "GET",
            "/title/4D5307E6/sessions/0000000000000001/properties",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, "GET", "/title/not-hex/sessions/1/context", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
