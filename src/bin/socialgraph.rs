//! Socialgraph CLI: load a seed into an in-memory graph and query it.
//!
//! Usage:
//!   socialgraph --seed net.yaml users
//!   socialgraph --seed net.yaml friends alice@example.com
//!   socialgraph --seed net.yaml [--config cfg.yaml] communities

use clap::{Parser, Subcommand};
use serde::Serialize;
use socialgraph::{EngineConfig, Seed, SocialGraph, User, UserId};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "socialgraph",
    version,
    about = "Friendship graph queries and community detection"
)]
struct Cli {
    /// Engine config (YAML); defaults to the user config dir if present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed document with users and requests
    #[arg(long)]
    seed: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every user
    Users,
    /// Accepted friends of a user
    Friends {
        /// Email of the user
        email: String,
    },
    /// Pending requests sent and received by a user
    Requests {
        /// Email of the user
        email: String,
    },
    /// Adjacency list of accepted friendships
    Relations,
    /// Every community, in discovery order
    Communities,
    /// Members of the largest community
    MostSocial,
}

#[derive(Serialize)]
struct Requests {
    sent: Vec<User>,
    received: Vec<User>,
}

fn open_graph(config: Option<PathBuf>, seed: &PathBuf) -> Result<SocialGraph, String> {
    let config = EngineConfig::load_or_default(config.as_deref())
        .map_err(|e| format!("Failed to load config: {}", e))?;
    let seed = Seed::load(seed).map_err(|e| format!("Failed to load seed: {}", e))?;
    let graph = SocialGraph::in_memory_with(config);
    seed.apply(&graph)
        .map_err(|e| format!("Failed to apply seed: {}", e))?;
    Ok(graph)
}

fn user_by_email(graph: &SocialGraph, email: &str) -> Result<User, String> {
    graph
        .find_user_by_email(email)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("user '{}' not found", email))
}

/// Resolve ids for display, dropping any that vanished
fn users_of(graph: &SocialGraph, ids: &[UserId]) -> Result<Vec<User>, String> {
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(user) = graph.find_user(id).map_err(|e| e.to_string())? {
            users.push(user);
        }
    }
    Ok(users)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

fn run(graph: &SocialGraph, command: Commands) -> Result<(), String> {
    let e2s = |e: socialgraph::SocialError| e.to_string();
    match command {
        Commands::Users => print_json(&graph.all_users().map_err(e2s)?),
        Commands::Friends { email } => {
            let user = user_by_email(graph, &email)?;
            print_json(&graph.friends_of(&user.id).map_err(e2s)?)
        }
        Commands::Requests { email } => {
            let user = user_by_email(graph, &email)?;
            print_json(&Requests {
                sent: graph.sent_requests_of(&user.id).map_err(e2s)?,
                received: graph.received_requests_of(&user.id).map_err(e2s)?,
            })
        }
        Commands::Relations => print_json(&graph.relations().map_err(e2s)?),
        Commands::Communities => {
            let communities = graph.communities().map_err(e2s)?;
            let mut resolved = Vec::with_capacity(communities.len());
            for members in &communities {
                resolved.push(users_of(graph, members)?);
            }
            print_json(&resolved)
        }
        Commands::MostSocial => print_json(&graph.most_social_community().map_err(e2s)?),
    }
}

fn main() {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,socialgraph=info".into()))
        .init();

    let cli = Cli::parse();
    let graph = match open_graph(cli.config, &cli.seed) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run(&graph, cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
