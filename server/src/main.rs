use anyhow::Result;
use axum::Router;
use clap::Parser;
use recsys_core::RecommenderConfig;
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Data directory holding products.json, users.json, carts.json and interactions.json
    #[arg(long, default_value = "./sample_data")]
    data: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Maximum number of content-based recommendations
    #[arg(long, default_value_t = 10)]
    top_k: usize,
    /// Minimum purchase count for a product to count as popular
    #[arg(long, default_value_t = 2)]
    popularity_threshold: u32,
    /// Count each buyer once per product instead of every cart entry
    #[arg(long, default_value_t = false)]
    distinct_buyers: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = RecommenderConfig {
        top_k: args.top_k,
        popularity_threshold: args.popularity_threshold,
        distinct_buyers: args.distinct_buyers,
    };
    let app: Router = build_app(args.data.clone(), config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, data = %args.data, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
