use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use letterboxd_recs::{
    api::{create_router, AppState},
    config::Config,
    models::{FilterState, Genre, Mode, PopularityTier},
    services::{LetterboxdRecsProvider, RequestController, SubmitOutcome},
};

#[derive(Parser, Debug)]
#[command(about = "Film recommendations for Letterboxd users")]
struct Cli {
    /// Recommendation service base URL (overrides RECS_API_URL)
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the filter and request endpoints over HTTP
    Serve,
    /// Request recommendations once and print them
    Recs {
        /// One username, or two to blend
        #[arg(required = true, num_args = 1..=2)]
        usernames: Vec<String>,
        /// Keep films that are on the watchlist
        #[arg(long)]
        include_watchlist: bool,
        /// Popularity tier: 1, 2 or 3
        #[arg(long)]
        popularity: Option<PopularityTier>,
        /// Restrict to a genre; repeat for several
        #[arg(long = "genre")]
        genres: Vec<Genre>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.recs_api_url = api_url;
    }

    let provider = Arc::new(LetterboxdRecsProvider::new(&config.recs_api_url)?);

    match cli.command {
        Command::Serve => {
            let app = create_router(AppState::new(provider));
            let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
            tracing::info!(addr = %config.bind_addr(), "Server running");
            axum::serve(listener, app).await?;
        }
        Command::Recs {
            usernames,
            include_watchlist,
            popularity,
            genres,
        } => {
            let mut filters = FilterState::new();
            if usernames.len() > 1 {
                filters.set_mode(Mode::Blend);
            }
            for (index, username) in usernames.iter().enumerate() {
                filters.set_username(index, username);
            }
            filters.set_exclude_watchlist(!include_watchlist);
            filters.toggle_popularity_tier(popularity);
            for genre in genres {
                if !filters.genre_filters.contains(&genre) {
                    filters.toggle_genre(genre);
                }
            }

            let controller = RequestController::new(provider);
            match controller.submit(&filters).await {
                SubmitOutcome::Success(results) => {
                    for rec in results {
                        println!("{}\t{}", rec.title, rec.link);
                    }
                }
                SubmitOutcome::Failed(message) => anyhow::bail!(message),
                SubmitOutcome::Ignored => anyhow::bail!("A request is already in progress"),
            }
        }
    }

    Ok(())
}
