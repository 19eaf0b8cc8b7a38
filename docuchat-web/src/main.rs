//! Docuchat Web Server
//!
//! HTTP interface for docuchat - chat with your documents over RAG.

use clap::Parser;
use docuchat_web::server::DocuchatServerBuilder;
use docuchat_web::{init_logging, WebConfig};

/// Docuchat web server - chat with your documents
#[derive(Parser)]
#[command(name = "docuchat-web")]
#[command(about = "A web interface for docuchat")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL for chunk, cache and history storage
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    std::env::set_var(
        "RUST_LOG",
        format!("docuchat_web={},tower_http=debug", args.log_level),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = args.dev;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    println!("🚀 Starting docuchat web server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    println!("🗄️  Database: {}", config.database_url);

    if std::env::var("OPENAI_API_KEY").is_err()
        && std::env::var("ANTHROPIC_API_KEY").is_err()
        && std::env::var("OLLAMA_HOST").is_err()
    {
        println!("⚠️  Warning: no LLM credentials found (OPENAI_API_KEY, ANTHROPIC_API_KEY or OLLAMA_HOST).");
        println!("   The server will start but query answering will fail.");
    }

    let server = match DocuchatServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .database_url(config.database_url.clone())
        .build()
        .await
    {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}
