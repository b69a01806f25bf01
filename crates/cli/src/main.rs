use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use catalog::{load_catalog, load_ratings, CatalogStore, MovieId, PopularityRanker, RatingStore, UserId};
use engine::{Recommendation, RecommendationEngine, Strategy};
use factor::{FactorModel, ModelHandle, TrainConfig, TrainError};
use sentiment::{BowClassifier, SEED_CORPUS};
use similarity::ContentIndex;

/// CineRec - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "cinerec")]
#[command(about = "Movie recommendations via content similarity, collaborative filtering, and a hybrid blend", long_about = None)]
struct Cli {
    /// Path to the movie catalog (JSON Lines)
    #[arg(long, default_value = "data/movies.jsonl")]
    movies: PathBuf,

    /// Path to the rating log (JSON Lines)
    #[arg(long, default_value = "data/ratings.jsonl")]
    ratings: PathBuf,

    /// Seed for latent factor model training
    #[arg(long, default_value = "42")]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Strategy: content, collaborative, or hybrid
        #[arg(long, default_value = "hybrid")]
        strategy: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show the movies most similar to a given movie
    Similar {
        /// Movie ID to find neighbors for
        #[arg(long)]
        movie_id: MovieId,

        /// Number of neighbors to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Summarize the sentiment of a batch of reviews
    Sentiment {
        /// Path to a JSON array of review texts
        #[arg(long)]
        reviews: PathBuf,
    },

    /// Run a recommendation throughput benchmark
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load the stores (shared by every command)
    println!("Loading catalog from {}...", cli.movies.display());
    let start = Instant::now();
    let catalog = Arc::new(load_catalog(&cli.movies).context("Failed to load movie catalog")?);
    let ratings = Arc::new(load_ratings(&cli.ratings).context("Failed to load rating log")?);
    println!(
        "{} Loaded {} movies and {} rating entries in {:?}",
        "✓".green(),
        catalog.len(),
        ratings.entry_count(),
        start.elapsed()
    );

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            strategy,
            limit,
        } => handle_recommend(catalog, ratings, cli.seed, user_id, &strategy, limit)?,
        Commands::Similar { movie_id, limit } => handle_similar(catalog, movie_id, limit)?,
        Commands::Search { title } => handle_search(catalog, ratings, &title)?,
        Commands::Sentiment { reviews } => handle_sentiment(&reviews)?,
        Commands::Benchmark { requests } => {
            handle_benchmark(catalog, ratings, cli.seed, requests).await?
        }
    }

    Ok(())
}

/// Build the full engine: content index, popularity ranking, trained model.
///
/// An empty rating log is not fatal; the engine serves content-based and
/// popularity results without a model.
fn build_engine(
    catalog: Arc<CatalogStore>,
    ratings: Arc<RatingStore>,
    seed: u64,
) -> Result<RecommendationEngine> {
    let start = Instant::now();
    let content = Arc::new(ContentIndex::build(&catalog));
    let popularity = Arc::new(PopularityRanker::build(catalog.clone(), &ratings));

    let config = TrainConfig::default().with_seed(seed);
    let model = match FactorModel::train(&ratings.all_ratings(), &config) {
        Ok(trained) => ModelHandle::with_model(trained),
        Err(TrainError::NoObservations) => {
            warn!("No rating observations; collaborative results will be empty");
            ModelHandle::empty()
        }
        Err(e) => return Err(e).context("Failed to train latent factor model"),
    };

    println!(
        "{} Built engine (index + model) in {:?}",
        "✓".green(),
        start.elapsed()
    );

    Ok(RecommendationEngine::new(
        catalog, ratings, popularity, content, model,
    ))
}

/// Handle the 'recommend' command
fn handle_recommend(
    catalog: Arc<CatalogStore>,
    ratings: Arc<RatingStore>,
    seed: u64,
    user_id: UserId,
    strategy: &str,
    limit: usize,
) -> Result<()> {
    let engine = build_engine(catalog, ratings, seed)?;

    // Both parse and dispatch validate at the engine boundary
    let strategy: Strategy = strategy.parse()?;
    let recommendations = engine.recommend(user_id, strategy, limit)?;

    if recommendations.is_empty() {
        println!("No recommendations available for user {}", user_id);
        return Ok(());
    }
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(catalog: Arc<CatalogStore>, movie_id: MovieId, limit: usize) -> Result<()> {
    let movie = catalog
        .get_movie(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?
        .clone();

    let index = ContentIndex::build(&catalog);
    let neighbors = index.most_similar(movie_id, limit);

    println!(
        "{}",
        format!("Movies similar to '{}':", movie.title).bold().blue()
    );
    for (rank, (id, score)) in neighbors.iter().enumerate() {
        if let Some(neighbor) = catalog.get_movie(*id) {
            println!(
                "{}. {} [{}] - similarity {:.3}",
                (rank + 1).to_string().green(),
                neighbor.title,
                neighbor.genres.join(", "),
                score
            );
        }
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(
    catalog: Arc<CatalogStore>,
    ratings: Arc<RatingStore>,
    title: &str,
) -> Result<()> {
    let ranker = PopularityRanker::build(catalog.clone(), &ratings);
    let matches = catalog.search_title(title);

    println!(
        "{}",
        format!("Search results for '{}':", title).bold().blue()
    );
    for movie in matches.iter().take(20) {
        match ranker.stats(movie.id) {
            Some(stats) => println!(
                "{}: {} [{}] avg {:.2} ({} ratings)",
                movie.id,
                movie.title,
                movie.genres.join(", "),
                stats.avg_score,
                stats.rating_count
            ),
            None => println!(
                "{}: {} [{}] (no ratings)",
                movie.id,
                movie.title,
                movie.genres.join(", ")
            ),
        }
    }
    Ok(())
}

/// Handle the 'sentiment' command
fn handle_sentiment(reviews_path: &PathBuf) -> Result<()> {
    let content = fs::read_to_string(reviews_path)
        .with_context(|| format!("Failed to read reviews from {}", reviews_path.display()))?;
    let reviews: Vec<String> =
        serde_json::from_str(&content).context("Reviews file must be a JSON array of strings")?;

    let classifier =
        BowClassifier::train(SEED_CORPUS).context("Failed to train sentiment classifier")?;
    let summary = classifier.summarize(&reviews);

    println!("{}", "Review sentiment:".bold().blue());
    println!("{} positive: {}", "•".green(), summary.positive);
    println!("{} negative: {}", "•".red(), summary.negative);
    println!("{} neutral:  {}", "•".yellow(), summary.neutral);
    println!(
        "Average polarity across {} reviews: {:.2}",
        summary.total_reviews, summary.average_score
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<CatalogStore>,
    ratings: Arc<RatingStore>,
    seed: u64,
    requests: usize,
) -> Result<()> {
    let users = ratings.user_ids();
    if users.is_empty() {
        println!("No users in the rating log; nothing to benchmark");
        return Ok(());
    }

    let engine = Arc::new(build_engine(catalog, ratings, seed)?);

    // Requests cycle through known users; the engine itself is synchronous,
    // so each one runs on the blocking pool
    let mut handles = Vec::with_capacity(requests);
    for request in 0..requests {
        let engine = engine.clone();
        let user_id = users[request % users.len()];
        handles.push(tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            engine
                .recommend(user_id, Strategy::Hybrid, 10)
                .map(|_| start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }

    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation]) {
    println!("{}", "Movie Recommendations:".bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - score {:.3} ({:?})",
            (rank + 1).to_string().green(),
            rec.title,
            rec.genres.join(", "),
            rec.score,
            rec.source
        );
    }
}
