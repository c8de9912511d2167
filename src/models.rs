use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MAX_RATING: f64 = 10.0;
pub const MAX_REVIEW_CHARS: usize = 250;

/// A search hit from the movie database, before its detail is fetched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl Candidate {
    pub fn external_id(&self) -> String {
        self.id.to_string()
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(year_from_release_date)
    }
}

/// Everything needed to create a movie record, as resolved from the movie database.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieDetail {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub img_url: String,
}

impl MovieDetail {
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in
            [("title", &self.title), ("description", &self.description), ("img_url", &self.img_url)]
        {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// A rating/review pair that has passed validation. Only constructible through
/// [`RatingReview::new`] or [`validate_rating_review`].
#[derive(Clone, Debug, PartialEq)]
pub struct RatingReview {
    rating: f64,
    review: String,
}

impl RatingReview {
    pub fn new(rating: f64, review: &str) -> AppResult<Self> {
        if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
            return Err(AppError::validation(format!(
                "rating must be between 0 and {MAX_RATING}, got {rating}"
            )));
        }

        let review = review.trim();
        if review.is_empty() {
            return Err(AppError::validation("review must not be empty"));
        }
        if review.chars().count() > MAX_REVIEW_CHARS {
            return Err(AppError::validation(format!(
                "review must be at most {MAX_REVIEW_CHARS} characters"
            )));
        }

        // -0.0 would otherwise sort below 0.0
        Ok(Self { rating: rating + 0.0, review: review.to_string() })
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn review(&self) -> &str {
        &self.review
    }
}

/// Validates the edit form input: a decimal rating such as `"7.5"` and a review.
pub fn validate_rating_review(rating: &str, review: &str) -> AppResult<RatingReview> {
    let rating: f64 = rating
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("rating {rating:?} is not a number")))?;
    RatingReview::new(rating, review)
}

/// `"2010-07-16"` -> `2010`. The year is whatever precedes the first `-`.
pub fn year_from_release_date(release_date: &str) -> Option<i32> {
    release_date.split('-').next()?.trim().parse().ok()
}
