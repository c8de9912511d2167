use crate::entities::movie;

fn rating_key(movie: &movie::Model) -> f64 {
    movie.rating.unwrap_or(f64::NEG_INFINITY)
}

/// Orders a snapshot of the collection best-first and assigns each record
/// `ranking = N - index`, so the top-rated movie gets `N` and the lowest gets `1`.
///
/// The sort is stable: equal ratings keep their input order, and the earlier one
/// ranks higher. Unrated records sort below every rated one. Nothing is written;
/// see [`crate::store::MovieStore::persist_ranking`].
pub fn rank(records: Vec<movie::Model>) -> Vec<movie::Model> {
    let mut ranked = records;
    ranked.sort_by(|a, b| rating_key(b).total_cmp(&rating_key(a)));

    let n = ranked.len();
    for (index, movie) in ranked.iter_mut().enumerate() {
        movie.ranking = Some((n - index) as i32);
    }
    ranked
}
