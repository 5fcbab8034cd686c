/// NicePlay - headless playback client
mod engine;
mod settings;

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::SimulatedEngine;
use niceplay_client::{NicePlayClient, PlaylistSummary};
use niceplay_core::{format_duration, PlaybackContext, TrackDescriptor, TrackId};
use niceplay_playback::{
    PlayOutcome, PlaybackController, PlaybackSnapshot, QueueResolver, TransportState,
};
use niceplay_sources::{load_liked_songs, open_playlist, SourceRegistry};
use settings::NicePlayConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "niceplay")]
#[command(about = "Headless NicePlay playback client", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "NICEPLAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a track from a context and follow the session
    Play {
        /// Context: banner, chart, recommendation, liked:<id>, playlist:<id>
        context: String,
        /// Track id to start with (default: first track of the context)
        #[arg(short, long)]
        track: Option<String>,
        /// Number of tracks to play before exiting
        #[arg(short = 'n', long, default_value_t = 1)]
        tracks: usize,
        /// Simulated length of every track in seconds
        #[arg(long, default_value_t = 3)]
        track_secs: u64,
    },
    /// Print the queue a context resolves to
    Queue {
        /// Context: banner, chart, recommendation, liked:<id>, playlist:<id>
        context: String,
    },
    /// List the logged-in user's playlists
    Playlists,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "niceplay=info,niceplay_playback=info,niceplay_sources=info,niceplay_client=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = NicePlayConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let client = NicePlayClient::new(config.api_config())?;
    if let Some((identifier, password)) = config.account.credentials() {
        let user = client.login(identifier, password).await?;
        tracing::info!(user = %user.username, "Logged in");
    }
    let sources = SourceRegistry::from_client(client.clone(), &config.sources_config());

    let result = match cli.command {
        Commands::Play {
            context,
            track,
            tracks,
            track_secs,
        } => {
            let context = parse_context(&context)?;
            play(
                &config,
                &client,
                &sources,
                context,
                track.map(TrackId::from),
                tracks,
                Duration::from_secs(track_secs),
            )
            .await
        }
        Commands::Queue { context } => {
            let context = parse_context(&context)?;
            print_queue(&client, &sources, &context).await
        }
        Commands::Playlists => list_playlists(&client).await,
    };

    // Logout teardown
    if client.is_authenticated().await {
        client.logout().await;
        sources.reset_all();
    }

    result
}

fn parse_context(raw: &str) -> anyhow::Result<PlaybackContext> {
    raw.parse()
        .with_context(|| format!("'{}' is not a playback context", raw))
}

/// Fill the side-loaded cache a library context resolves against
async fn prepare_context(
    client: &NicePlayClient,
    sources: &SourceRegistry,
    context: &PlaybackContext,
) -> anyhow::Result<()> {
    match context {
        PlaybackContext::LikedSongs(_) => {
            let info = load_liked_songs(client, sources.liked_songs()).await?;
            tracing::info!(playlist = %info.name, tracks = info.track_count, "Liked songs loaded");
        }
        PlaybackContext::UserPlaylist(id) => {
            let summary = match find_playlist(client, id.as_str()).await? {
                Some(summary) => summary,
                None => PlaylistSummary {
                    id: id.clone(),
                    name: String::new(),
                    description: None,
                    cover_url: None,
                    tracks: None,
                    plays: None,
                    created_at: None,
                },
            };
            let info = open_playlist(client, sources.current_playlist(), &summary).await?;
            tracing::info!(playlist = %info.name, tracks = info.track_count, "Playlist opened");
        }
        PlaybackContext::Banner | PlaybackContext::Chart | PlaybackContext::Recommendation => {}
    }
    Ok(())
}

async fn find_playlist(
    client: &NicePlayClient,
    id: &str,
) -> anyhow::Result<Option<PlaylistSummary>> {
    let Some(user) = client.current_user().await else {
        return Ok(None);
    };
    let library = client.playlists().get_user_playlists(&user.id).await?;
    Ok(library
        .playlists
        .into_iter()
        .find(|playlist| playlist.id.as_str() == id))
}

async fn play(
    config: &NicePlayConfig,
    client: &NicePlayClient,
    sources: &SourceRegistry,
    context: PlaybackContext,
    track: Option<TrackId>,
    tracks: usize,
    track_length: Duration,
) -> anyhow::Result<()> {
    prepare_context(client, sources, &context).await?;

    let resolver = QueueResolver::new(sources.clone());
    let track_id = match track {
        Some(track_id) => track_id,
        None => resolver
            .resolve_queue(&context)
            .await?
            .first()
            .map(|track| track.track_id.clone())
            .with_context(|| format!("{} has no tracks", context))?,
    };

    let controller = Arc::new(PlaybackController::new(
        resolver,
        Box::new(SimulatedEngine::new(Some(track_length))),
        config.playback.clone(),
    ));
    tokio::spawn(Arc::clone(&controller).run_engine_events());

    let store = controller.store();
    let (tx, mut snapshots) = mpsc::unbounded_channel();
    let _subscription = store.subscribe(move |snapshot: &PlaybackSnapshot| {
        let _ = tx.send(snapshot.clone());
    });

    match controller.handle_play(track_id, context).await? {
        PlayOutcome::Started(track) => print_track("Now playing", &track),
        PlayOutcome::Superseded => return Ok(()),
    }
    print_upcoming(&store.derive_upcoming(config.playback.upcoming_count));

    let mut started = 1;
    let mut last = store.read().current_track.map(|t| t.track_id);
    let patience = track_length + Duration::from_secs(10);
    while started < tracks {
        let snapshot = match tokio::time::timeout(patience, snapshots.recv()).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => break,
            Err(_) => {
                tracing::warn!("Playback did not advance, giving up");
                break;
            }
        };
        if snapshot.transport_state != TransportState::Playing {
            continue;
        }
        let current = snapshot.current_track.as_ref().map(|t| t.track_id.clone());
        if current != last && current.is_some() {
            started += 1;
            last = current;
            if let Some(track) = &snapshot.current_track {
                print_track("Now playing", track);
            }
            print_upcoming(&store.derive_upcoming(config.playback.upcoming_count));
        }
    }

    tokio::time::sleep(track_length).await;
    controller.stop().await;
    controller.reset().await;
    Ok(())
}

async fn print_queue(
    client: &NicePlayClient,
    sources: &SourceRegistry,
    context: &PlaybackContext,
) -> anyhow::Result<()> {
    prepare_context(client, sources, context).await?;

    let queue = QueueResolver::new(sources.clone())
        .resolve_queue(context)
        .await?;

    println!("{} ({} tracks)", context, queue.len());
    for (index, track) in queue.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}{}",
            index + 1,
            track.track_id,
            label(track),
            track
                .duration
                .map(|d| format!(" ({})", format_duration(d)))
                .unwrap_or_default()
        );
    }
    Ok(())
}

async fn list_playlists(client: &NicePlayClient) -> anyhow::Result<()> {
    let user = client
        .require_user()
        .await
        .context("configure [account] to list playlists")?;
    let library = client.playlists().get_user_playlists(&user.id).await?;

    println!("Playlists of {}:", user.username);
    for playlist in &library.playlists {
        println!(
            "  [{}] {} ({} tracks)",
            playlist.id,
            playlist.name,
            playlist.tracks.unwrap_or_default()
        );
    }
    Ok(())
}

fn label(track: &TrackDescriptor) -> String {
    if track.artist.is_empty() {
        track.title.clone()
    } else {
        format!("{} - {}", track.title, track.artist)
    }
}

fn print_track(heading: &str, track: &TrackDescriptor) {
    println!("{}: {}", heading, label(track));
}

fn print_upcoming(upcoming: &[TrackDescriptor]) {
    if upcoming.is_empty() {
        return;
    }
    println!("Up next:");
    for track in upcoming {
        println!("  {}", label(track));
    }
}
