//! In-process stand-in for the movie database, for tests.

use std::{collections::HashMap, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::tmdb::{TmdbClient, TmdbConfig};

pub const STUB_API_KEY: &str = "test-key";
pub const STUB_IMAGE_BASE: &str = "https://image.test/t/p/w500";

/// Requests slower than this fail on the client side.
const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

pub fn stub_client() -> reqwest::Client {
    reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build().unwrap()
}

pub async fn stub_tmdb() -> TmdbClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });

    TmdbClient::new(
        stub_client(),
        TmdbConfig {
            api_key: STUB_API_KEY.to_string(),
            base_url: format!("http://{addr}"),
            image_base_url: STUB_IMAGE_BASE.to_string(),
            rps: 100,
        },
    )
}

fn router() -> Router {
    Router::new().route("/search/movie", get(search)).route("/movie/{id}", get(detail))
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or_default()
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    if param(&params, "api_key") != STUB_API_KEY
        || param(&params, "page") != "1"
        || param(&params, "include_adult") != "true"
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match param(&params, "query") {
        "Inception" => Json(json!({ "results": [{ "id": 42, "title": "Inception" }] })).into_response(),
        "Heat" => Json(json!({
            "results": [
                { "id": 949, "title": "Heat", "release_date": "1995-12-15", "poster_path": "/heat.jpg" },
                { "id": 43, "title": "X", "release_date": "2010-07-16", "poster_path": "/p.jpg" }
            ]
        }))
        .into_response(),
        "Broken detail" => Json(json!({ "results": [{ "id": 7, "title": "No poster" }] })).into_response(),
        "slow" => {
            tokio::time::sleep(CLIENT_TIMEOUT * 4).await;
            Json(json!({ "results": [] })).into_response()
        },
        "broken" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "garbled" => "<html>not json</html>".into_response(),
        _ => Json(json!({ "results": [] })).into_response(),
    }
}

async fn detail(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if param(&params, "api_key") != STUB_API_KEY || param(&params, "language") != "en-US" {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match id.as_str() {
        // 42 and 43 resolve to the same title
        "42" | "43" => Json(json!({
            "title": "X",
            "release_date": "2010-07-16",
            "poster_path": "/p.jpg",
            "overview": "A thief who steals corporate secrets through dream-sharing."
        }))
        .into_response(),
        "949" => Json(json!({
            "title": "Heat",
            "release_date": "1995-12-15",
            "poster_path": "/heat.jpg",
            "overview": "Obsessive master thief Neil McCauley leads a top-notch crew."
        }))
        .into_response(),
        "7" => Json(json!({
            "title": "No poster",
            "release_date": "2001-01-01",
            "poster_path": null,
            "overview": "Nothing to see."
        }))
        .into_response(),
        "8" => Json(json!({
            "title": "Unreleased",
            "release_date": "",
            "poster_path": "/u.jpg",
            "overview": "Coming eventually."
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
