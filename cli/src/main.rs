use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use recsys_core::persist::{load_carts, load_catalog, load_interactions, load_users, DataPaths};
use recsys_core::session::{find_user, reference_set};
use recsys_core::{CatalogSnapshot, Engine, ProductId, RecommenderConfig, RequestContext};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recsys")]
#[command(about = "Inspect a product catalog and compute TF-IDF recommendations offline", long_about = None)]
struct Cli {
    /// Data directory holding products.json, users.json, carts.json and interactions.json
    #[arg(long, global = true, default_value = "./sample_data")]
    data: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print catalog and vocabulary statistics as JSON
    Stats,
    /// Print the vocabulary with document frequency and IDF per term
    Vocab,
    /// Print recommendations for one user
    Recommend {
        #[arg(long)]
        user: String,
        /// Maximum number of content-based recommendations
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Minimum purchase count for a product to count as popular
        #[arg(long, default_value_t = 2)]
        popularity_threshold: u32,
        /// Count each buyer once per product instead of every cart entry
        #[arg(long, default_value_t = false)]
        distinct_buyers: bool,
    },
    /// Print the cosine similarity between two products
    Similar {
        #[arg(long)]
        a: ProductId,
        #[arg(long)]
        b: ProductId,
    },
}

#[derive(Serialize)]
struct Stats {
    num_categories: usize,
    num_products: usize,
    num_terms: usize,
    zero_vectors: usize,
    generated_at: String,
}

#[derive(Serialize)]
struct VocabEntry<'a> {
    term: &'a str,
    df: u32,
    idf: f64,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let paths = DataPaths::new(&cli.data);

    match cli.command {
        Commands::Stats => stats(&paths),
        Commands::Vocab => vocab(&paths),
        Commands::Recommend { user, k, popularity_threshold, distinct_buyers } => {
            let config = RecommenderConfig { top_k: k, popularity_threshold, distinct_buyers };
            recommend(&paths, &user, config)
        }
        Commands::Similar { a, b } => similar(&paths, a, b),
    }
}

fn snapshot(paths: &DataPaths) -> Result<CatalogSnapshot> {
    let catalog = load_catalog(paths)?;
    Ok(CatalogSnapshot::build(catalog))
}

fn stats(paths: &DataPaths) -> Result<()> {
    let s = snapshot(paths)?;
    let zero_vectors = s
        .products()
        .filter(|p| s.vector(p.id).map_or(true, |v| v.norm_squared() == 0.0))
        .count();
    let stats = Stats {
        num_categories: s.catalog().categories.len(),
        num_products: s.len(),
        num_terms: s.vocabulary().len(),
        zero_vectors,
        generated_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn vocab(paths: &DataPaths) -> Result<()> {
    let s = snapshot(paths)?;
    let idf = s.idf();
    let entries: Vec<VocabEntry> = s
        .vocabulary()
        .terms()
        .iter()
        .enumerate()
        .map(|(i, term)| VocabEntry { term, df: idf.df[i], idf: idf.weights[i] })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn recommend(paths: &DataPaths, user: &str, config: RecommenderConfig) -> Result<()> {
    let users = load_users(paths)?;
    let user = find_user(&users, user).ok_or_else(|| anyhow!("unknown user {user}"))?;
    let carts = load_carts(paths)?;
    let interactions = load_interactions(paths)?;
    let s = snapshot(paths)?;

    let cart = carts.get(&user.username).cloned().unwrap_or_default();
    let history = interactions.get(&user.username).cloned().unwrap_or_default();
    let reference = reference_set(&cart, &history);
    let ctx = RequestContext { username: &user.username, reference: &reference, carts: &carts };
    let products = Engine::new(config).recommend(&s, &ctx);
    if products.is_empty() {
        println!("no recommendations available for {}", user.username);
        return Ok(());
    }
    tracing::info!(user = %user.username, count = products.len(), "recommendations computed");
    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}

fn similar(paths: &DataPaths, a: ProductId, b: ProductId) -> Result<()> {
    let s = snapshot(paths)?;
    let similarity = s.similarity(a, b).ok_or_else(|| anyhow!("unknown product id in ({a}, {b})"))?;
    println!("{similarity:.6}");
    Ok(())
}
