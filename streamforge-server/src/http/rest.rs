//! REST projections of the Config Repository, plus health/status/test-alert
//! (spec.md §6).

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use streamforge_core::{
    AlertPatch, EventLogFilter, EventType, NewAlert, NewEventLog, NewTemplate, NewVariation,
    TemplatePatch, TriggerFacts, VariationPatch,
};

use crate::app_state::AppState;
use crate::errors::AppError;
use crate::hub::{NAMESPACE_ALERTS, NAMESPACE_CHAT, NAMESPACE_DASHBOARD, NAMESPACE_WIDGETS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/ws/status", get(ws_status))
        .route("/api/test-alert", post(test_alert))
        .route("/api/test-alert/clear", post(test_alert_clear))
        .route("/api/test-alert/status", get(test_alert_status))
        .route(
            "/api/events",
            get(list_events).delete(delete_events_before),
        )
        .route("/api/events/range", get(list_events_range))
        .route("/api/alerts", get(list_alerts).post(create_alert))
        .route(
            "/api/alerts/:id",
            get(get_alert).patch(update_alert).delete(delete_alert),
        )
        .route(
            "/api/alerts/:id/variations",
            get(list_variations).post(create_variation),
        )
        .route(
            "/api/variations/:id",
            get(get_variation).patch(update_variation).delete(delete_variation),
        )
        .route("/api/templates", get(list_templates).post(create_template))
        .route(
            "/api/templates/:id",
            get(get_template).patch(update_template).delete(delete_template),
        )
        .route("/api/settings", get(list_settings))
        .route("/api/settings/:key", get(get_setting).put(set_setting))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "port": state.port(),
        "uptime_seconds": state.uptime_seconds(),
    }))
}

async fn ws_status(State(state): State<AppState>) -> Json<Value> {
    let counts = state.hub.counts().await;
    let total: usize = counts.values().sum();
    Json(json!({
        "namespaces": [NAMESPACE_ALERTS, NAMESPACE_CHAT, NAMESPACE_WIDGETS, NAMESPACE_DASHBOARD],
        "clients": counts,
        "totalClients": total,
    }))
}

async fn test_alert(
    State(state): State<AppState>,
    Json(facts): Json<TriggerFacts>,
) -> Result<Json<Value>, AppError> {
    let event_type = facts.event_type;
    let username = facts.username.clone();
    let display_name = facts.display_name.clone();
    let amount = facts.amount;
    let message = facts.message.clone();

    let alert_id = state.queue.enqueue(facts).await?;
    let status = if alert_id.is_some() { "queued" } else { "rejected" };

    if let (Some(event_type), Some(username)) = (event_type, username) {
        record_event(
            &state,
            NewEventLog {
                platform: "test".to_string(),
                event_type,
                username,
                display_name,
                amount,
                message,
                metadata: None,
                alert_fired: alert_id.is_some(),
            },
        )
        .await;
    }

    Ok(Json(json!({
        "status": status,
        "alertId": alert_id,
        "queueLength": state.queue.length().await,
    })))
}

async fn test_alert_clear(State(state): State<AppState>) -> Json<Value> {
    let cleared = state.queue.clear().await;
    Json(json!({ "cleared": cleared }))
}

async fn test_alert_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "currentAlert": Value::Null,
        "queueLength": state.queue.length().await,
    }))
}

#[derive(Debug, Deserialize)]
struct EventListQuery {
    event_type: Option<EventType>,
    platform: Option<String>,
    #[serde(default)]
    alert_fired_only: bool,
    search: Option<String>,
    limit: Option<u32>,
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = EventLogFilter {
        event_type: query.event_type,
        platform: query.platform,
        alert_fired_only: query.alert_fired_only,
        search: query.search,
        limit: query.limit,
    };
    let events = state.repository.list_event_log(&filter).await?;
    Ok(Json(json!(events)))
}

#[derive(Debug, Deserialize)]
struct EventRangeQuery {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

async fn list_events_range(
    State(state): State<AppState>,
    Query(query): Query<EventRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let events = state
        .repository
        .list_event_log_range(query.from, query.to)
        .await?;
    Ok(Json(json!(events)))
}

#[derive(Debug, Deserialize)]
struct DeleteEventsQuery {
    before: DateTime<Utc>,
}

async fn delete_events_before(
    State(state): State<AppState>,
    Query(query): Query<DeleteEventsQuery>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.repository.delete_event_log_before(query.before).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// Not part of the router — called by `test_alert`, the one ingest path
/// inside this boundary (spec.md §4.6 "insert with server-generated id";
/// platform connectors that would call this from elsewhere are external
/// collaborators per spec.md §2).
async fn record_event(state: &AppState, new_event: NewEventLog) {
    if let Err(err) = state.repository.create_event_log(new_event).await {
        tracing::warn!(%err, "failed to record event log row");
    }
}

#[derive(Debug, Deserialize)]
struct ListAlertsQuery {
    event_type: Option<EventType>,
    #[serde(default)]
    enabled_only: bool,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<Value>, AppError> {
    let alerts = match (query.event_type, query.enabled_only) {
        (Some(event_type), _) => state.repository.list_alerts_by_type(event_type).await?,
        (None, true) => state.repository.list_enabled_alerts().await?,
        (None, false) => state.repository.list_alerts().await?,
    };
    Ok(Json(json!(alerts)))
}

async fn create_alert(
    State(state): State<AppState>,
    Json(new_alert): Json<NewAlert>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.create_alert(new_alert).await?)))
}

async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.get_alert(id).await?)))
}

async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AlertPatch>,
) -> Result<Json<Value>, AppError> {
    let alert = state.repository.update_alert(id, patch).await?;
    state
        .hub
        .broadcast(NAMESPACE_WIDGETS, "config:changed", json!({ "alertId": id }))
        .await;
    Ok(Json(json!(alert)))
}

async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.repository.delete_alert(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

async fn list_variations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.list_variations_by_parent(id).await?)))
}

async fn create_variation(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
    Json(mut new_variation): Json<NewVariation>,
) -> Result<Json<Value>, AppError> {
    new_variation.parent_alert_id = parent_id;
    Ok(Json(json!(state.repository.create_variation(new_variation).await?)))
}

async fn get_variation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.get_variation(id).await?)))
}

async fn update_variation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<VariationPatch>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.update_variation(id, patch).await?)))
}

async fn delete_variation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.repository.delete_variation(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

async fn list_templates(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.list_templates().await?)))
}

async fn create_template(
    State(state): State<AppState>,
    Json(new_template): Json<NewTemplate>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.create_template(new_template).await?)))
}

async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.get_template(id).await?)))
}

async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TemplatePatch>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.update_template(id, patch).await?)))
}

async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.repository.delete_template(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

async fn list_settings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.list_settings().await?)))
}

async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.repository.get_setting(&key).await?)))
}

#[derive(Debug, Deserialize)]
struct SetSettingBody {
    value: String,
}

async fn set_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<SetSettingBody>,
) -> Result<Json<Value>, AppError> {
    let setting = state.repository.set_setting(&key, &body.value).await?;
    Ok(Json(json!(setting)))
}
