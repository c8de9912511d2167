//! Personal movie collection: a ranked list of movies added from TMDB, each with
//! the owner's rating and review.

pub mod collection;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod ranking;
pub mod store;
pub mod tmdb;

#[cfg(test)]
mod testing;

pub use collection::{AddFlow, AddFlowState, MovieCollection};
pub use config::Config;
pub use error::{AppError, AppResult};
