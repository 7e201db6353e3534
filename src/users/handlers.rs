use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{error::AppError, state::AppState};

use super::{
    dto::{User, UserDraft, UserPatch},
    extract::JsonOrEmpty,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let store = state.store.read().await;
    Json(store.list().to_vec())
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let store = state.store.read().await;
    match store.get(&id) {
        Ok(user) => Ok(Json(user.clone())),
        Err(e) => {
            warn!(%id, "user lookup missed");
            Err(e.into())
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonOrEmpty(payload): JsonOrEmpty<UserDraft>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let created = state.store.write().await.create(payload).map_err(|e| {
        warn!(error = %e, "create rejected");
        e
    })?;
    info!(id = %created.id, name = %created.name, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, payload))]
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonOrEmpty(payload): JsonOrEmpty<UserDraft>,
) -> Result<Json<User>, AppError> {
    let updated = state.store.write().await.replace(&id, payload).map_err(|e| {
        warn!(%id, error = %e, "replace rejected");
        e
    })?;
    info!(%id, "user replaced");
    Ok(Json(updated))
}

#[instrument(skip(state, payload))]
pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonOrEmpty(payload): JsonOrEmpty<UserPatch>,
) -> Result<Json<User>, AppError> {
    let updated = state.store.write().await.patch(&id, payload).map_err(|e| {
        warn!(%id, error = %e, "patch rejected");
        e
    })?;
    info!(%id, "user patched");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.store.write().await.remove(&id).map_err(|e| {
        warn!(%id, "delete missed");
        e
    })?;
    info!(id = %removed.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState, users::dto::User};

    fn seeded_state() -> AppState {
        AppState::with_users(vec![User {
            id: "0001".into(),
            name: "Alice".into(),
            email: "alice@x.com".into(),
            status: "Active".into(),
        }])
    }

    async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = build_app(state.clone())
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status().as_u16();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn list_returns_all_users() {
        let state = seeded_state();
        let (status, body) = call(&state, Method::GET, "/api/users", None).await;
        assert_eq!(status, 200);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], "0001");
    }

    #[tokio::test]
    async fn get_unknown_user_is_404_with_error_body() {
        let state = seeded_state();
        let (status, body) = call(&state, Method::GET, "/api/users/0099", None).await;
        assert_eq!(status, 404);
        assert_eq!(body, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let state = seeded_state();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/users",
            Some(json!({"name": "Bob", "email": "b@x.com", "status": "Active", "id": "7777"})),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["id"], "0002");
        assert_eq!(body["name"], "Bob");
    }

    #[tokio::test]
    async fn create_missing_fields_is_400() {
        let state = seeded_state();
        let (status, body) =
            call(&state, Method::POST, "/api/users", Some(json!({"name": "A"}))).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Missing required fields: email, status");
        assert_eq!(state.store.read().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_400_with_error_body() {
        let state = seeded_state();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = build_app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status().as_u16(), 400);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn put_replaces_and_validates() {
        let state = seeded_state();
        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/users/0001",
            Some(json!({"name": "  Alicia ", "email": "  al@x.com  ", "status": "Inactive"})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["name"], "Alicia");
        assert_eq!(body["email"], "  al@x.com  ");
        assert_eq!(body["id"], "0001");

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/users/0001",
            Some(json!({"name": "x"})),
        )
        .await;
        assert_eq!(status, 400);

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/users/0042",
            Some(json!({"name": "x", "email": "e", "status": "Active"})),
        )
        .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn patch_touches_only_text_fields() {
        let state = seeded_state();
        let (status, body) = call(
            &state,
            Method::PATCH,
            "/api/users/0001",
            Some(json!({"status": "Inactive", "name": 5})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "Inactive");
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["email"], "alice@x.com");
    }

    #[tokio::test]
    async fn create_keeps_fields_as_sent() {
        let state = seeded_state();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/users",
            Some(json!({"name": " Bo ", "email": " b@x.com ", "status": "Active"})),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["name"], " Bo ");
        assert_eq!(body["email"], " b@x.com ");
    }

    #[tokio::test]
    async fn patch_without_body_leaves_record_unchanged() {
        let state = seeded_state();
        let (status, body) = call(&state, Method::PATCH, "/api/users/0001", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["name"], "Alice");

        let (status, body) =
            call(&state, Method::PATCH, "/api/users/0001", Some(Value::Null)).await;
        assert_eq!(status, 200);
        assert_eq!(body["email"], "alice@x.com");

        let req = Request::builder()
            .method(Method::PATCH)
            .uri("/api/users/0001")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::empty())
            .unwrap();
        let res = build_app(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn patch_unknown_id_without_body_is_404() {
        let state = seeded_state();
        let (status, body) = call(&state, Method::PATCH, "/api/users/0099", None).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn null_or_missing_body_lists_every_field() {
        let state = seeded_state();
        for body in [None, Some(Value::Null)] {
            let (status, res) = call(&state, Method::POST, "/api/users", body.clone()).await;
            assert_eq!(status, 400);
            assert_eq!(res["error"], "Missing required fields: name, email, status");

            let (status, res) = call(&state, Method::PUT, "/api/users/0001", body).await;
            assert_eq!(status, 400);
            assert_eq!(res["error"], "Missing required fields: name, email, status");
        }
        assert_eq!(state.store.read().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_204_then_404() {
        let state = seeded_state();
        let (status, body) = call(&state, Method::DELETE, "/api/users/0001", None).await;
        assert_eq!(status, 204);
        assert_eq!(body, Value::Null);

        let (status, body) = call(&state, Method::DELETE, "/api/users/0001", None).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "User not found");

        let (_, body) = call(
            &state,
            Method::POST,
            "/api/users",
            Some(json!({"name": "C", "email": "c@x.com", "status": "Active"})),
        )
        .await;
        assert_eq!(body["id"], "0002");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let res = build_app(AppState::fake()).oneshot(req).await.unwrap();
        assert_eq!(res.status().as_u16(), 200);
    }
}
