use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::CreateUserRequest,
        repo_types::{User, UserColumn, UserFilter, UserOrder},
    },
};

/// Ordering behind `/users/sort/a-z`: byte-wise ascending username.
const A_TO_Z: UserOrder = UserOrder::asc(UserColumn::Username);

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/id/:id", get(get_user_by_id))
        .route("/users/username/:username", get(get_user_by_username))
        .route("/users/sort/a-z", get(list_users_sorted))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.users.find_all(None).await.map_err(|e| {
        error!(error = %e, "find_all failed");
        AppError::from(e)
    })?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<User>> {
    let Path(id) = id.map_err(|e| {
        warn!(error = %e, "invalid user id");
        AppError::Validation(e.body_text())
    })?;

    match state.users.find_by_id(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => {
            warn!(%id, "user not found");
            Err(AppError::NotFound("User not found".into()))
        }
        Err(e) => {
            error!(error = %e, %id, "find_by_id failed");
            Err(e.into())
        }
    }
}

#[instrument(skip(state))]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    match state
        .users
        .find_one(UserFilter::Username(username.clone()))
        .await
    {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => {
            warn!(%username, "user not found");
            Err(AppError::NotFound("User not found".into()))
        }
        Err(e) => {
            error!(error = %e, %username, "find_one failed");
            Err(e.into())
        }
    }
}

#[instrument(skip(state))]
pub async fn list_users_sorted(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.users.find_all(Some(A_TO_Z)).await.map_err(|e| {
        error!(error = %e, "sorted find_all failed");
        AppError::from(e)
    })?;
    Ok(Json(users))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<Json<User>> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "invalid create user body");
        AppError::Validation(e.body_text())
    })?;
    let new_user = payload.into_new_user().map_err(|e| {
        warn!(error = %e, "create user rejected");
        e
    })?;

    let user = state.users.create(new_user).await.map_err(|e| {
        error!(error = %e, "create user failed");
        AppError::from(e)
    })?;

    info!(user_id = user.id, username = %user.username, "user created");
    Ok(Json(user))
}
