use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{MovieDetail, RatingReview},
};

/// Values a freshly added movie carries until the user rates it.
pub const PLACEHOLDER_RATING: f64 = 4.0;
pub const PLACEHOLDER_RANKING: i32 = 5;
pub const PLACEHOLDER_REVIEW: &str = "Not reviewed yet.";

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, detail: &MovieDetail) -> AppResult<movie::Model> {
        detail.validate()?;

        let existing = movie::Entity::find()
            .filter(movie::Column::Title.eq(detail.title.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateTitle(detail.title.clone()));
        }

        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(detail.title.clone()),
            year: Set(detail.year),
            description: Set(detail.description.clone()),
            rating: Set(Some(PLACEHOLDER_RATING)),
            ranking: Set(Some(PLACEHOLDER_RANKING)),
            review: Set(Some(PLACEHOLDER_REVIEW.to_string())),
            img_url: Set(detail.img_url.clone()),
        };

        let inserted = model.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::DuplicateTitle(detail.title.clone())
            },
            _ => AppError::Database(err),
        })?;

        debug!(movie_id = inserted.id, title = %inserted.title, "inserted movie");
        Ok(inserted)
    }

    pub async fn get(&self, id: i32) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound { id })
    }

    pub async fn update_rating_review(
        &self,
        id: i32,
        input: &RatingReview,
    ) -> AppResult<movie::Model> {
        let mut model = self.get(id).await?.into_active_model();
        model.rating = Set(Some(input.rating()));
        model.review = Set(Some(input.review().to_string()));

        let updated = model.update(&self.db).await?;
        debug!(movie_id = id, rating = input.rating(), "updated rating and review");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound { id });
        }
        debug!(movie_id = id, "deleted movie");
        Ok(())
    }

    /// Every stored movie, in insertion order. Ranking order is not applied here.
    pub async fn list_all(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?)
    }

    /// Writes the `ranking` of each given record back to its row.
    pub async fn persist_ranking(&self, ranked: &[movie::Model]) -> AppResult<()> {
        if ranked.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for movie in ranked {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(movie.ranking))
                .filter(movie::Column::Id.eq(movie.id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        debug!(count = ranked.len(), "persisted ranking");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::validate_rating_review};

    async fn store() -> MovieStore {
        MovieStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
    }

    fn detail(title: &str) -> MovieDetail {
        MovieDetail {
            title: title.to_string(),
            year: 2002,
            description: format!("{title} plot"),
            img_url: format!("https://image.tmdb.org/t/p/w500/{title}.jpg"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_placeholders() {
        let store = store().await;

        let first = store.insert(&detail("Phone Booth")).await.unwrap();
        let second = store.insert(&detail("Heat")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.rating, Some(PLACEHOLDER_RATING));
        assert_eq!(first.ranking, Some(PLACEHOLDER_RANKING));
        assert_eq!(first.review.as_deref(), Some(PLACEHOLDER_REVIEW));
        assert_eq!(store.get(first.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected_and_store_unchanged() {
        let store = store().await;
        store.insert(&detail("Heat")).await.unwrap();
        let before = store.list_all().await.unwrap();

        let err = store.insert(&detail("Heat")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateTitle(ref t) if t == "Heat"));
        assert_eq!(store.list_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn invalid_detail_is_not_inserted() {
        let store = store().await;
        let mut bad = detail("Heat");
        bad.img_url = String::new();

        assert!(matches!(store.insert(&bad).await, Err(AppError::Validation(_))));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = store().await;
        assert!(matches!(store.get(99).await, Err(AppError::NotFound { id: 99 })));
    }

    #[tokio::test]
    async fn update_overwrites_rating_and_review() {
        let store = store().await;
        let movie = store.insert(&detail("Heat")).await.unwrap();

        let input = validate_rating_review("9.2", "Diner scene.").unwrap();
        let updated = store.update_rating_review(movie.id, &input).await.unwrap();

        assert_eq!(updated.rating, Some(9.2));
        assert_eq!(updated.review.as_deref(), Some("Diner scene."));
        assert_eq!(updated.title, "Heat");
        assert_eq!(store.get(movie.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = store().await;
        let input = validate_rating_review("5", "ok").unwrap();
        assert!(matches!(
            store.update_rating_review(3, &input).await,
            Err(AppError::NotFound { id: 3 })
        ));
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_is_not_found() {
        let store = store().await;
        let keep = store.insert(&detail("Heat")).await.unwrap();
        let gone = store.insert(&detail("Ronin")).await.unwrap();

        store.delete(gone.id).await.unwrap();
        assert!(matches!(store.delete(gone.id).await, Err(AppError::NotFound { .. })));
        assert_eq!(store.list_all().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn list_all_is_in_insertion_order() {
        let store = store().await;
        for title in ["C", "A", "B"] {
            store.insert(&detail(title)).await.unwrap();
        }
        let titles: Vec<_> =
            store.list_all().await.unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn persist_ranking_writes_each_row() {
        let store = store().await;
        let mut a = store.insert(&detail("A")).await.unwrap();
        let mut b = store.insert(&detail("B")).await.unwrap();
        a.ranking = Some(1);
        b.ranking = Some(2);

        store.persist_ranking(&[a.clone(), b.clone()]).await.unwrap();

        assert_eq!(store.get(a.id).await.unwrap().ranking, Some(1));
        assert_eq!(store.get(b.id).await.unwrap().ranking, Some(2));
    }
}
