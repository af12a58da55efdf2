use super::parse_json;
use super::trips::parse_id;
use crate::backend::{CommunityPost, NewCommunityPost};
use crate::community::{self, FeedParams, FeedQuery, validate_new_post};
use crate::error::{Result, ServiceError};
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostRequest {
    pub user_id: Uuid,
    pub channel: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: Uuid,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<CommunityPost>>> {
    let query = FeedQuery::parse(&params).map_err(ServiceError::InvalidRequest)?;
    let client = state.backend()?;
    let posts = community::list_posts(client, &query).await?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CommunityPost>)> {
    let request: NewPostRequest = parse_json(&body)?;
    let post = NewCommunityPost {
        user_id: request.user_id,
        channel: request.channel,
        title: request.title.trim().to_string(),
        content: request.content.trim().to_string(),
        image_url: request.image_url,
    };
    validate_new_post(&post).map_err(ServiceError::InvalidRequest)?;

    let client = state.backend()?;
    let created = community::create_post(client, &post).await?;
    tracing::info!("Created community post {} in {}", created.id, created.channel);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn like_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CommunityPost>> {
    let post_id = parse_id(&id)?;
    let request: LikeRequest = parse_json(&body)?;
    let client = state.backend()?;
    Ok(Json(community::like_post(client, post_id, request.user_id).await?))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CommunityPost>> {
    let post_id = parse_id(&id)?;
    let request: LikeRequest = parse_json(&body)?;
    let client = state.backend()?;
    Ok(Json(community::unlike_post(client, post_id, request.user_id).await?))
}
