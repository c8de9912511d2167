use std::{str::FromStr, time::Duration};

use anyhow::Context;

use crate::tmdb::TmdbConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub tmdb: TmdbConfig,
    pub http_timeout: Duration,
    pub persist_ranking_on_list: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movie-collection.db?mode=rwc".to_string());

        let api_key = std::env::var("TMDB_API_KEY").unwrap_or_else(|_| "".to_string());
        let base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let image_base_url = std::env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org/t/p/w500".to_string());

        let rps: u32 = parse_var("TMDB_RPS", std::env::var("TMDB_RPS").ok(), 4)?;
        let timeout_secs: u64 =
            parse_var("HTTP_TIMEOUT_SECS", std::env::var("HTTP_TIMEOUT_SECS").ok(), 30)?;
        let persist_ranking_on_list: bool = parse_var(
            "PERSIST_RANKING_ON_LIST",
            std::env::var("PERSIST_RANKING_ON_LIST").ok(),
            true,
        )?;

        Ok(Self {
            database_url,
            tmdb: TmdbConfig { api_key, base_url, image_base_url, rps },
            http_timeout: Duration::from_secs(timeout_secs),
            persist_ranking_on_list,
        })
    }
}

/// Parses an optional environment value, falling back to `default` when unset.
fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(s) => s.trim().parse().with_context(|| format!("{name}={s:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_use_defaults() {
        assert_eq!(parse_var::<u32>("TMDB_RPS", None, 4).unwrap(), 4);
        assert_eq!(parse_var::<u64>("HTTP_TIMEOUT_SECS", None, 30).unwrap(), 30);
        assert!(parse_var::<bool>("PERSIST_RANKING_ON_LIST", None, true).unwrap());
    }

    #[test]
    fn set_values_are_parsed() {
        assert_eq!(parse_var::<u32>("TMDB_RPS", Some(" 10 ".into()), 4).unwrap(), 10);
        assert!(!parse_var::<bool>("PERSIST_RANKING_ON_LIST", Some("false".into()), true).unwrap());
    }

    #[test]
    fn malformed_value_names_the_variable() {
        for name in ["TMDB_RPS", "HTTP_TIMEOUT_SECS"] {
            let err = parse_var::<u64>(name, Some("abc".into()), 1).unwrap_err();
            assert!(format!("{err:#}").contains(name), "{err:#}");
        }

        let err = parse_var::<bool>("PERSIST_RANKING_ON_LIST", Some("abc".into()), true).unwrap_err();
        assert!(format!("{err:#}").contains("PERSIST_RANKING_ON_LIST"), "{err:#}");
    }
}
