use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::operations::{lists, searches, words};
use crate::response::{ok, AppError, QueryParams};
use crate::services::search::{normalize_query, search, SearchFilter, SearchResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(run_search))
        .route("/api/search/recent", get(recent).delete(clear_recent))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    filter: SearchFilter,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    query: String,
    filter: &'static str,
    results: Vec<SearchResult>,
    recent_searches: Vec<String>,
}

fn filter_name(filter: SearchFilter) -> &'static str {
    match filter {
        SearchFilter::All => "all",
        SearchFilter::Lists => "lists",
        SearchFilter::Words => "words",
    }
}

async fn run_search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    QueryParams(params): QueryParams<SearchQuery>,
) -> Result<Response, AppError> {
    let Some(query) = normalize_query(&params.q) else {
        let recent_searches = searches::recent_searches(state.db(), &user.id).await?;
        return Ok(ok(SearchResponse {
            query: String::new(),
            filter: filter_name(params.filter),
            results: Vec::new(),
            recent_searches,
        }));
    };

    let user_lists = lists::lists_for_user(state.db(), &user.id).await?;
    let user_words = words::words_for_user(state.db(), &user.id).await?;
    let results = search(&user_lists, &user_words, &query, params.filter);
    let recent_searches = searches::record_search(state.db(), &user.id, &query).await?;

    Ok(ok(SearchResponse {
        query,
        filter: filter_name(params.filter),
        results,
        recent_searches,
    }))
}

async fn recent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let recent = searches::recent_searches(state.db(), &user.id).await?;
    Ok(ok(recent))
}

async fn clear_recent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, AppError> {
    searches::clear_searches(state.db(), &user.id).await?;
    Ok(ok(Vec::<String>::new()))
}
