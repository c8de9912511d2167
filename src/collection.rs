use tracing::{debug, info};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Candidate, validate_rating_review},
    ranking,
    store::MovieStore,
    tmdb::TmdbClient,
};

/// The operations a user of the collection performs.
pub struct MovieCollection {
    store: MovieStore,
    tmdb: TmdbClient,
    persist_ranking_on_list: bool,
}

impl MovieCollection {
    pub fn new(store: MovieStore, tmdb: TmdbClient, persist_ranking_on_list: bool) -> Self {
        Self { store, tmdb, persist_ranking_on_list }
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    /// All movies, best-first, with freshly computed rankings. When configured to,
    /// the rankings are written back before returning.
    pub async fn list_ranked(&self) -> AppResult<Vec<movie::Model>> {
        let ranked = ranking::rank(self.store.list_all().await?);
        if self.persist_ranking_on_list {
            self.store.persist_ranking(&ranked).await?;
        }
        Ok(ranked)
    }

    pub async fn get_movie(&self, id: i32) -> AppResult<movie::Model> {
        self.store.get(id).await
    }

    pub async fn search_movies(&self, query: &str) -> AppResult<Vec<Candidate>> {
        self.tmdb.search(validate_query(query)?).await
    }

    /// Looks up `external_id` upstream and stores it with placeholder rating and review.
    pub async fn add_from_external(&self, external_id: &str) -> AppResult<movie::Model> {
        let detail = self.tmdb.detail(external_id).await?;
        let movie = self.store.insert(&detail).await?;
        info!(movie_id = movie.id, external_id = %external_id, title = %movie.title, "added movie");
        Ok(movie)
    }

    pub async fn update_rating_review(
        &self,
        id: i32,
        rating: &str,
        review: &str,
    ) -> AppResult<movie::Model> {
        let input = validate_rating_review(rating, review)?;
        self.store.update_rating_review(id, &input).await
    }

    pub async fn delete_movie(&self, id: i32) -> AppResult<()> {
        self.store.delete(id).await?;
        info!(movie_id = id, "removed movie");
        Ok(())
    }
}

fn validate_query(query: &str) -> AppResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::validation("movie title must not be empty"));
    }
    Ok(query)
}

#[derive(Clone, Debug, PartialEq)]
pub enum AddFlowState {
    Idle,
    Searching { query: String },
    CandidatesListed(Vec<Candidate>),
    DetailFetching { external_id: String },
    Inserted(movie::Model),
}

impl AddFlowState {
    fn name(&self) -> &'static str {
        match self {
            AddFlowState::Idle => "idle",
            AddFlowState::Searching { .. } => "searching",
            AddFlowState::CandidatesListed(_) => "candidates_listed",
            AddFlowState::DetailFetching { .. } => "detail_fetching",
            AddFlowState::Inserted(_) => "inserted",
        }
    }
}

/// Drives "search, pick a candidate, insert it". An upstream failure at any step
/// drops the flow back to [`AddFlowState::Idle`].
pub struct AddFlow<'a> {
    collection: &'a MovieCollection,
    state: AddFlowState,
}

impl<'a> AddFlow<'a> {
    pub fn new(collection: &'a MovieCollection) -> Self {
        Self { collection, state: AddFlowState::Idle }
    }

    pub fn state(&self) -> &AddFlowState {
        &self.state
    }

    fn transition(&mut self, next: AddFlowState) {
        debug!(from = self.state.name(), to = next.name(), "add flow");
        self.state = next;
    }

    pub async fn search(&mut self, query: &str) -> AppResult<Vec<Candidate>> {
        if !matches!(self.state, AddFlowState::Idle | AddFlowState::CandidatesListed(_)) {
            return Err(AppError::validation(format!(
                "cannot search while the add flow is {}",
                self.state.name()
            )));
        }
        let query = validate_query(query)?;

        self.transition(AddFlowState::Searching { query: query.to_string() });
        match self.collection.search_movies(query).await {
            Ok(candidates) => {
                self.transition(AddFlowState::CandidatesListed(candidates.clone()));
                Ok(candidates)
            },
            Err(err) => {
                self.transition(AddFlowState::Idle);
                Err(err)
            },
        }
    }

    /// Inserts the listed candidate with `external_id`.
    pub async fn select(&mut self, external_id: &str) -> AppResult<movie::Model> {
        let AddFlowState::CandidatesListed(candidates) = &self.state else {
            return Err(AppError::validation(format!(
                "no candidates to choose from while the add flow is {}",
                self.state.name()
            )));
        };
        if !candidates.iter().any(|c| c.external_id() == external_id.trim()) {
            return Err(AppError::validation(format!(
                "{external_id:?} is not one of the listed candidates"
            )));
        }

        self.transition(AddFlowState::DetailFetching { external_id: external_id.to_string() });
        match self.collection.add_from_external(external_id).await {
            Ok(movie) => {
                self.transition(AddFlowState::Inserted(movie.clone()));
                Ok(movie)
            },
            Err(err) => {
                self.transition(AddFlowState::Idle);
                Err(err)
            },
        }
    }

    /// Returns to idle, handing back the inserted movie if there is one.
    pub fn finish(&mut self) -> Option<movie::Model> {
        let previous = std::mem::replace(&mut self.state, AddFlowState::Idle);
        debug!(from = previous.name(), to = "idle", "add flow");
        match previous {
            AddFlowState::Inserted(movie) => Some(movie),
            _ => None,
        }
    }
}
