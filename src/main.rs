use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use topten::{
    AddFlow, Config, MovieCollection, db, entities::movie, models::Candidate, store::MovieStore,
    tmdb::TmdbClient,
};

/// Keep a ranked list of your favourite movies
#[derive(Parser)]
#[command(name = "topten")]
#[command(about = "Personal movie collection ranked by your own ratings", long_about = None)]
struct Cli {
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the collection, best rated first
    List,

    /// Show one movie
    Show { id: i32 },

    /// Search the movie database by title
    Search { query: String },

    /// Add a movie by its movie database id
    Add { external_id: String },

    /// Search by title and optionally add one of the results
    Find {
        query: String,

        /// 1-based position of the result to add
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Set your rating (0-10, e.g. 7.5) and review for a movie
    Rate {
        id: i32,

        #[arg(allow_hyphen_values = true)]
        rating: String,

        review: String,
    },

    /// Remove a movie from the collection
    Delete { id: i32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,topten=info,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("topten/0.1")
        .timeout(config.http_timeout)
        .build()?;

    let db = db::connect_and_migrate(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    let tmdb = TmdbClient::new(http, config.tmdb.clone());
    let collection =
        MovieCollection::new(MovieStore::new(db), tmdb, config.persist_ranking_on_list);

    match cli.command {
        Commands::List => {
            let movies = collection.list_ranked().await?;
            emit(cli.json, &movies, || print_movies(&movies))?;
        },
        Commands::Show { id } => {
            let movie = collection.get_movie(id).await?;
            emit(cli.json, &movie, || print_movie(&movie))?;
        },
        Commands::Search { query } => {
            let candidates = collection.search_movies(&query).await?;
            emit(cli.json, &candidates, || print_candidates(&candidates))?;
        },
        Commands::Add { external_id } => {
            let movie = collection.add_from_external(&external_id).await?;
            emit(cli.json, &movie, || {
                print_movie(&movie);
                println!("Rate it with: topten rate {} <rating> <review>", movie.id);
            })?;
        },
        Commands::Find { query, pick } => {
            let mut flow = AddFlow::new(&collection);
            let candidates = flow.search(&query).await?;

            let Some(pick) = pick else {
                emit(cli.json, &candidates, || print_candidates(&candidates))?;
                return Ok(());
            };

            let Some(candidate) = pick.checked_sub(1).and_then(|i| candidates.get(i)) else {
                bail!("--pick {pick} is out of range; the search returned {} result(s)", candidates.len());
            };

            flow.select(&candidate.external_id()).await?;
            if let Some(movie) = flow.finish() {
                emit(cli.json, &movie, || print_movie(&movie))?;
            }
        },
        Commands::Rate { id, rating, review } => {
            let movie = collection.update_rating_review(id, &rating, &review).await?;
            emit(cli.json, &movie, || print_movie(&movie))?;
        },
        Commands::Delete { id } => {
            collection.delete_movie(id).await?;
            if !cli.json {
                println!("Deleted movie {id}");
            }
        },
    }

    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn print_movies(movies: &[movie::Model]) {
    if movies.is_empty() {
        println!("The collection is empty. Add a movie with: topten find <title>");
        return;
    }
    for movie in movies {
        print_movie(movie);
    }
}

fn print_movie(movie: &movie::Model) {
    let ranking = movie.ranking.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
    let rating = movie.rating.map(|r| format!("{r:.1}")).unwrap_or_else(|| "unrated".to_string());
    println!("#{ranking} [{}] {} ({}) {rating}/10", movie.id, movie.title, movie.year);
    if let Some(review) = &movie.review {
        println!("    {review}");
    }
}

fn print_candidates(candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("No matches.");
        return;
    }
    for (i, c) in candidates.iter().enumerate() {
        let year = c.release_year().map(|y| y.to_string()).unwrap_or_else(|| "????".to_string());
        println!("{:>2}. {} ({year})  id {}", i + 1, c.title, c.id);
    }
}
