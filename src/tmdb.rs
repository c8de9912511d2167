use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    models::{Candidate, MovieDetail, year_from_release_date},
};

const MOCK_TMDB_ID: i64 = 1817;
const MOCK_TITLE: &str = "Phone Booth";
const MOCK_RELEASE_DATE: &str = "2002-11-14";
const MOCK_POSTER_PATH: &str = "/tjrX2oWRCM3Tvarz38zlZM7Uc10.jpg";
const MOCK_OVERVIEW: &str = "Publicist Stuart Shepard finds himself trapped in a phone booth, \
    pinned down by an extortionist's sniper rifle. Unable to leave or receive outside help, \
    Stuart's negotiation with the caller leads to a jaw-dropping climax.";

/// Connection settings for the movie database, handed to [`TmdbClient::new`].
#[derive(Clone, Debug)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    /// Prefix for poster paths, e.g. `https://image.tmdb.org/t/p/w500`.
    pub image_base_url: String,
    pub rps: u32,
}

pub struct TmdbClient {
    client: reqwest::Client,
    config: TmdbConfig,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, config: TmdbConfig) -> Self {
        // Warn once on app load if using mock data
        if config.api_key.trim().is_empty() {
            warn!("Using mock TMDB data - no TMDB_API_KEY provided");
        }

        let rps = NonZeroU32::new(config.rps.max(1)).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, config, limiter }
    }

    pub fn is_mock(&self) -> bool {
        self.config.api_key.trim().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Searches movies by title. Zero matches is an empty list, not an error.
    pub async fn search(&self, query: &str) -> AppResult<Vec<Candidate>> {
        if self.is_mock() {
            return Ok(vec![mock_candidate()]);
        }

        self.limiter.until_ready().await;
        debug!(query = %query, "searching TMDB");

        let resp: SearchResponse = async {
            let resp = self
                .client
                .get(self.url("search/movie"))
                .query(&[
                    ("api_key", self.config.api_key.as_str()),
                    ("query", query),
                    ("page", "1"),
                    ("include_adult", "true"),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<SearchResponse>()
                .await?;
            Ok::<_, AppError>(resp)
        }
        .await
        .inspect_err(|err| warn!(query = %query, error = %err, "TMDB search failed"))?;

        debug!(query = %query, results = resp.results.len(), "TMDB search done");
        Ok(resp.results)
    }

    /// Fetches full detail for one movie and maps it to a record-ready [`MovieDetail`].
    pub async fn detail(&self, external_id: &str) -> AppResult<MovieDetail> {
        let external_id = external_id.trim();
        if external_id.is_empty() || !external_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::validation(format!(
                "external id {external_id:?} is not a TMDB movie id"
            )));
        }

        if self.is_mock() {
            return DetailResponse::mock().into_detail(&self.config.image_base_url);
        }

        self.limiter.until_ready().await;
        debug!(external_id = %external_id, "fetching TMDB movie detail");

        let resp: DetailResponse = async {
            let resp = self
                .client
                .get(self.url(&format!("movie/{external_id}")))
                .query(&[("api_key", self.config.api_key.as_str()), ("language", "en-US")])
                .send()
                .await?
                .error_for_status()?
                .json::<DetailResponse>()
                .await?;
            Ok::<_, AppError>(resp)
        }
        .await
        .inspect_err(|err| warn!(external_id = %external_id, error = %err, "TMDB detail failed"))?;

        resp.into_detail(&self.config.image_base_url)
    }
}

fn mock_candidate() -> Candidate {
    Candidate {
        id: MOCK_TMDB_ID,
        title: MOCK_TITLE.to_string(),
        release_date: Some(MOCK_RELEASE_DATE.to_string()),
        poster_path: Some(MOCK_POSTER_PATH.to_string()),
        overview: Some(MOCK_OVERVIEW.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

impl DetailResponse {
    fn mock() -> Self {
        Self {
            title: Some(MOCK_TITLE.to_string()),
            release_date: Some(MOCK_RELEASE_DATE.to_string()),
            overview: Some(MOCK_OVERVIEW.to_string()),
            poster_path: Some(MOCK_POSTER_PATH.to_string()),
        }
    }

    fn into_detail(self, image_base_url: &str) -> AppResult<MovieDetail> {
        let title = required("title", self.title)?;
        let release_date = required("release_date", self.release_date)?;
        let description = required("overview", self.overview)?;
        let poster_path = required("poster_path", self.poster_path)?;

        let year = year_from_release_date(&release_date).ok_or_else(|| {
            AppError::malformed(format!("release_date {release_date:?} has no leading year"))
        })?;

        Ok(MovieDetail { title, year, description, img_url: format!("{image_base_url}{poster_path}") })
    }
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::malformed(format!("detail response is missing `{field}`")))
}
