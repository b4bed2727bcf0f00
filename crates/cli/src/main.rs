use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::UserId;
use ingestion::{Collection, Collector, LineSource};
use rand::Rng;
use server::{ModelSnapshot, RecommendationService, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendation engine using collaborative filtering", long_about = None)]
struct Cli {
    /// Training artifact (JSON array of ratings)
    #[arg(long, env = "REEL_RECS_ARTIFACT", default_value = "ratings.json", global = true)]
    artifact: PathBuf,

    /// Kafka bootstrap address
    #[arg(long, env = "REEL_RECS_BROKER", default_value = "localhost:9092", global = true)]
    broker: String,

    /// Activity topic
    #[arg(long, env = "REEL_RECS_TOPIC", default_value = "movielog18", global = true)]
    topic: String,

    /// Kafka consumer group
    #[arg(long, env = "REEL_RECS_GROUP_ID", default_value = "reel-recs", global = true)]
    group_id: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect activity for a fixed window and write the training artifact
    Collect {
        /// Collection window in seconds
        #[arg(long, env = "REEL_RECS_WINDOW_SECS", default_value = "20")]
        seconds: u64,

        /// Replay a captured activity log instead of Kafka ("-" for stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the artifact (defaults to --artifact)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Train on the artifact and report model statistics
    Train,

    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, env = "REEL_RECS_LIMIT", default_value = "5")]
        limit: usize,
    },

    /// Answer one user id per stdin line
    Serve {
        /// Number of recommendations per answer
        #[arg(long, env = "REEL_RECS_LIMIT", default_value = "5")]
        limit: usize,

        /// Reload the artifact and retrain every S seconds
        #[arg(long, env = "REEL_RECS_RETRAIN_SECS")]
        retrain_secs: Option<u64>,
    },

    /// Print recommendations for random known users
    Demo {
        /// Number of requests to make
        #[arg(long, default_value = "10")]
        requests: usize,

        /// Number of recommendations per request
        #[arg(long, env = "REEL_RECS_LIMIT", default_value = "5")]
        limit: usize,
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
    let config = ServiceConfig::default()
        .with_artifact_path(cli.artifact)
        .with_broker(cli.broker)
        .with_topic(cli.topic)
        .with_group_id(cli.group_id);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Collect {
            seconds,
            input,
            output,
        } => {
            let mut config = config.with_collection_window(Duration::from_secs(seconds));
            if let Some(output) = output {
                config = config.with_artifact_path(output);
            }
            handle_collect(&config, input)?
        }
        Commands::Train => handle_train(&config)?,
        Commands::Recommend { user_id, limit } => {
            handle_recommend(&config.with_num_recommendations(limit), user_id)?
        }
        Commands::Serve {
            limit,
            retrain_secs,
        } => handle_serve(config.with_num_recommendations(limit), retrain_secs).await?,
        Commands::Demo { requests, limit } => {
            handle_demo(&config.with_num_recommendations(limit), requests)?
        }
    }

    Ok(())
}

/// Handle the 'collect' command
fn handle_collect(config: &ServiceConfig, input: Option<PathBuf>) -> Result<()> {
    let collector = Collector::new(config.collection_window);
    println!(
        "Collecting activity for {:?}...",
        collector.window()
    );

    let collection = match input {
        Some(path) if path.as_os_str() == "-" => collector.collect(LineSource::stdin()),
        Some(path) => collector.collect_with(|| LineSource::open(&path)),
        None => collect_from_kafka(&collector, config)?,
    };

    let events = server::write_training_artifact(&collection.records, &config.artifact_path)?;

    let stats = &collection.stats;
    if stats.connect_failed {
        println!("{} Could not reach the activity source", "!".yellow());
    }
    println!(
        "{} {} messages received, {} records kept, {} dropped, {} late",
        "✓".green(),
        stats.parse.received,
        collection.records.len(),
        stats.parse.dropped(),
        stats.late
    );
    println!(
        "{} Wrote {} ratings to {}",
        "✓".green(),
        events.len(),
        config.artifact_path.display()
    );
    Ok(())
}

#[cfg(feature = "kafka")]
fn collect_from_kafka(collector: &Collector, config: &ServiceConfig) -> Result<Collection> {
    let settings = ingestion::KafkaSettings {
        brokers: config.broker.clone(),
        topic: config.topic.clone(),
        group_id: config.group_id.clone(),
        connect_timeout: Duration::from_secs(5),
    };
    Ok(collector.collect_with(|| ingestion::KafkaSource::connect(&settings)))
}

#[cfg(not(feature = "kafka"))]
fn collect_from_kafka(_collector: &Collector, config: &ServiceConfig) -> Result<Collection> {
    anyhow::bail!(
        "built without Kafka support; rebuild with --features kafka to read {} from {}, or pass --input",
        config.topic,
        config.broker
    )
}

/// Handle the 'train' command
fn handle_train(config: &ServiceConfig) -> Result<()> {
    let start = Instant::now();
    let snapshot = load_model(config)?;

    print!("{}", "Model statistics:\n".bold().blue());
    println!("{}Rating events: {}", "• ".green(), snapshot.event_count);
    println!(
        "{}Rating matrix: {} users x {} movies",
        "• ".green(),
        snapshot.user_count(),
        snapshot.movie_count()
    );
    println!(
        "{}Stored ratings: {} ({:.4}% dense)",
        "• ".green(),
        snapshot.ratings.nnz(),
        snapshot.ratings.density() * 100.0
    );
    println!(
        "{}Similarity matrix: {} x {}",
        "• ".cyan(),
        snapshot.similarity.len(),
        snapshot.similarity.len()
    );
    println!("{}Trained in {:.2?}", "• ".cyan(), start.elapsed());
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(config: &ServiceConfig, user_id: UserId) -> Result<()> {
    let snapshot = load_model(config)?;
    let known = snapshot.ratings.row_of(user_id).is_some();
    let service = RecommendationService::new(snapshot);

    let movies = service.recommend_movies(user_id, config.num_recommendations);
    print_recommendations(user_id, &movies);
    if !known {
        println!("{} User {} is not in the model; showing the default list", "!".yellow(), user_id);
    }
    Ok(())
}

/// Handle the 'serve' command
async fn handle_serve(config: ServiceConfig, retrain_secs: Option<u64>) -> Result<()> {
    let service = Arc::new(RecommendationService::new(load_model(&config)?));

    let retrainer = retrain_secs.filter(|&s| s > 0).map(|secs| {
        info!("Retraining from {} every {}s", config.artifact_path.display(), secs);
        tokio::spawn(server::retrain_every(
            service.clone(),
            config.artifact_path.clone(),
            Duration::from_secs(secs),
        ))
    });

    println!("Ready. Enter one user id per line (Ctrl-D to stop).");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<UserId>() {
            Ok(user_id) => {
                let movies = service.recommend_movies(user_id, config.num_recommendations);
                println!("{}", movies.join(","));
            }
            Err(_) => warn!("Ignoring request {:?}: not a user id", line),
        }
    }

    if let Some(handle) = retrainer {
        handle.abort();
    }
    Ok(())
}

/// Handle the 'demo' command
fn handle_demo(config: &ServiceConfig, requests: usize) -> Result<()> {
    let snapshot = load_model(config)?;
    let users = snapshot.ratings.users().to_vec();
    anyhow::ensure!(
        !users.is_empty(),
        "No users in {}; run `reel-recs collect` first",
        config.artifact_path.display()
    );
    let service = RecommendationService::new(snapshot);

    let mut rng = rand::rng();
    let mut timings = Vec::with_capacity(requests);
    for _ in 0..requests {
        let user_id = users[rng.random_range(0..users.len())];
        let start = Instant::now();
        let movies = service.recommend_movies(user_id, config.num_recommendations);
        timings.push(start.elapsed());
        print_recommendations(user_id, &movies);
    }

    if !timings.is_empty() {
        let total: Duration = timings.iter().sum();
        println!(
            "{} {} requests, average latency {:?}",
            "✓".green(),
            timings.len(),
            total / timings.len() as u32
        );
    }
    Ok(())
}

fn load_model(config: &ServiceConfig) -> Result<ModelSnapshot> {
    println!("Training from {}...", config.artifact_path.display());
    let start = Instant::now();
    let snapshot = ModelSnapshot::from_artifact(&config.artifact_path)
        .context("Failed to train model")?;
    println!(
        "{} Trained on {} users in {:?}",
        "✓".green(),
        snapshot.user_count(),
        start.elapsed()
    );
    Ok(snapshot)
}

/// Helper function to format and print recommendations
fn print_recommendations(user_id: UserId, movies: &[String]) {
    println!("{}", format!("Recommendations for user {}:", user_id).bold().blue());
    for (rank, movie) in movies.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), movie);
    }
}
