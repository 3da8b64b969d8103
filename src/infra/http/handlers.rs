use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use postcache_api_types::{
    CacheKeyQuery, Envelope, PageQuery, PostCreateRequest, PostUpdateRequest, SearchQuery,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::error::{ErrorKind, ErrorReport, POST_NOT_FOUND};
use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::posts::{CreatePostCommand, UpdatePostCommand};
use crate::domain::entities::PostRecord;

use super::error::ApiError;
use super::state::ApiState;

const SHOW_NOT_FOUND: &str = "Post not found";
const CACHE_ENTRY_NOT_FOUND: &str = "Cache entry not found.";
const INVALID_BODY: &str = "The request body must be a JSON object.";

type ApiResult<T> = Result<Json<T>, ApiError>;

fn create_command(request: PostCreateRequest) -> CreatePostCommand {
    CreatePostCommand {
        title: request.title,
        content: request.content,
    }
}

fn update_command(request: PostUpdateRequest) -> UpdatePostCommand {
    UpdatePostCommand {
        title: request.title,
        content: request.content,
    }
}

/// -------- Posts --------
pub async fn list_posts(State(state): State<ApiState>) -> ApiResult<Envelope<Vec<PostRecord>>> {
    let posts = state
        .posts
        .list_all()
        .await
        .map_err(|err| ApiError::from_app("infra::http::list_posts", err))?;

    Ok(Json(Envelope::ok("posts data.", posts)))
}

pub async fn paged_posts(
    State(state): State<ApiState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Envelope<OffsetPage<PostRecord>>> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::validation(
            "infra::http::paged_posts",
            "The page and per_page parameters must be positive integers.",
            rejection.body_text(),
        )
    })?;

    let page = state
        .posts
        .paged(PageRequest::new(query.page, query.per_page))
        .await
        .map_err(|err| ApiError::from_app("infra::http::paged_posts", err))?;

    Ok(Json(Envelope::ok("paginated posts data.", page)))
}

/// Raw record; not-found answers `{"error": "Post not found"}`.
pub async fn show_post(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<PostRecord> {
    const SOURCE: &str = "infra::http::show_post";

    let id = post_id(SOURCE, id).map_err(|err| err.raw().with_message(SHOW_NOT_FOUND))?;

    match state.posts.show(id).await {
        Ok(post) => Ok(Json(post)),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ApiError::from_app(SOURCE, err)
            .raw()
            .with_message(SHOW_NOT_FOUND)),
        Err(err) => Err(ApiError::from_app(SOURCE, err).raw()),
    }
}

pub async fn search_posts(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<PostRecord>> {
    let posts = state
        .posts
        .search(query.query.as_deref())
        .await
        .map_err(|err| ApiError::from_app("infra::http::search_posts", err).raw())?;

    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<Envelope<PostRecord>> {
    const SOURCE: &str = "infra::http::create_post";

    let request: PostCreateRequest = decode_body(SOURCE, &body)?;
    let post = state
        .posts
        .create(create_command(request))
        .await
        .map_err(|err| ApiError::from_app(SOURCE, err))?;

    Ok(Json(Envelope::ok("Data inserted successfully.", post)))
}

/// Serves both `PUT` and `PATCH`; only supplied fields change.
pub async fn update_post(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<Envelope<PostRecord>> {
    const SOURCE: &str = "infra::http::update_post";

    let id = post_id(SOURCE, id)?;

    let request: PostUpdateRequest = match decode_body(SOURCE, &body) {
        Ok(request) => request,
        Err(err) => {
            // Unknown ids win over malformed bodies.
            state
                .posts
                .require(id)
                .await
                .map_err(|err| ApiError::from_app(SOURCE, err))?;
            return Err(err);
        }
    };

    let post = state
        .posts
        .update(id, update_command(request))
        .await
        .map_err(|err| ApiError::from_app(SOURCE, err))?;

    Ok(Json(Envelope::ok("Data updated successfully.", post)))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Envelope<Value>> {
    const SOURCE: &str = "infra::http::delete_post";

    let id = post_id(SOURCE, id)?;
    state
        .posts
        .delete(id)
        .await
        .map_err(|err| ApiError::from_app(SOURCE, err))?;

    Ok(Json(Envelope::empty("Data deleted successfully.", 200)))
}

/// -------- Cache --------
pub async fn get_cache(
    State(state): State<ApiState>,
    Query(query): Query<CacheKeyQuery>,
) -> ApiResult<Envelope<Value>> {
    const SOURCE: &str = "infra::http::get_cache";

    let value = state
        .posts
        .cached_value(query.key.as_deref())
        .await
        .map_err(|err| ApiError::from_app(SOURCE, err))?
        .ok_or_else(|| ApiError::not_found(SOURCE, CACHE_ENTRY_NOT_FOUND))?;

    Ok(Json(Envelope::ok("Cached data.", value)))
}

pub async fn delete_cache(
    State(state): State<ApiState>,
    Query(query): Query<CacheKeyQuery>,
) -> ApiResult<Envelope<bool>> {
    clear_cache(&state, query.key.as_deref()).await
}

pub async fn delete_cache_by_path(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> ApiResult<Envelope<bool>> {
    clear_cache(&state, Some(key.as_str())).await
}

async fn clear_cache(state: &ApiState, key: Option<&str>) -> ApiResult<Envelope<bool>> {
    state
        .posts
        .clear_cache(key)
        .await
        .map_err(|err| ApiError::from_app("infra::http::clear_cache", err))?;

    Ok(Json(Envelope::ok("Cache cleared.", true)))
}

/// -------- Health --------
pub async fn db_health(State(state): State<ApiState>) -> Response {
    match state.posts.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Non-numeric ids cannot name a post, so they share the not-found shape.
fn post_id(source: &'static str, id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(ApiError::new(
            source,
            StatusCode::NOT_FOUND,
            POST_NOT_FOUND,
            rejection.body_text(),
        )),
    }
}

/// Empty bodies decode as `T::default()`. Anything but a JSON object is rejected.
fn decode_body<T>(source: &'static str, body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let invalid = |detail: String| ApiError::validation(source, INVALID_BODY, detail);

    match serde_json::from_slice::<Value>(body).map_err(|err| invalid(err.to_string()))? {
        object @ Value::Object(_) => {
            serde_json::from_value(object).map_err(|err| invalid(err.to_string()))
        }
        _ => Err(invalid("expected a JSON object".to_string())),
    }
}
