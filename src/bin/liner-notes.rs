use clap::Parser;
use liner_notes::{DisplayState, EnrichmentResult, EnrichmentState, NowPlaying, Settings, SourceKind};
use std::path::PathBuf;
use tokio::task::LocalSet;

/// Show what is playing, with cover art, album context and lyrics interpretation
#[derive(Parser)]
#[command(name = "liner-notes", about = "Now-playing companion", long_about = None)]
struct Cli {
    /// Config file (defaults to LINER_NOTES_CONFIG_PATH or the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override poll.interval_ms
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Override source.kind
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Show detailed debug information
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(LocalSet::new().run_until(run(args))) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> liner_notes::Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_file(path)?,
        None => Settings::load()?,
    };
    if let Some(interval_ms) = args.interval_ms {
        settings.poll.interval_ms = interval_ms;
    }
    if let Some(kind) = args.source {
        settings.source.kind = kind;
    }

    let now_playing = NowPlaying::from_settings(&settings)?;
    let mut snapshot = now_playing.watch_snapshot();
    let mut artwork = now_playing.artwork().subscribe();
    let mut album_info = now_playing.album_info().subscribe();
    let mut lyrics = now_playing.lyrics().subscribe();

    now_playing.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_rendered = None;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            Ok(()) = snapshot.changed() => {}
            Ok(()) = artwork.changed() => {}
            Ok(()) = album_info.changed() => {}
            Ok(()) = lyrics.changed() => {}
        }

        let state = now_playing.display_state();
        if last_rendered.as_ref() != Some(&state) {
            render(&state);
            last_rendered = Some(state);
        }
    }

    now_playing.stop();
    Ok(())
}

fn render(state: &DisplayState) {
    println!();
    let Some(track) = &state.track else {
        println!("⏹  Nothing playing");
        return;
    };

    println!("🎵 {} by {}  [{}]", track.title, track.artist, track.status_label());
    println!("   💿 {}", track.album);

    match section(&state.artwork) {
        Ok(artwork) => println!("   🖼  {} ({} bytes)", artwork.url, artwork.bytes.len()),
        Err(status) => println!("   🖼  {status}"),
    }

    match section(&state.album_info) {
        Ok(info) => {
            if !info.release_year.is_empty() {
                println!("   📅 {} · {}", info.release_year, info.genre);
            }
            println!("   📖 {}", info.context);
            if !info.notable_fact.is_empty() {
                println!("   ✨ {}", info.notable_fact);
            }
        }
        Err(status) => println!("   📖 {status}"),
    }

    match section(&state.lyrics) {
        Ok(analysis) => println!("   📝 {}", analysis.interpretation),
        Err(status) => println!("   📝 {status}"),
    }
}

fn section<P>(result: &EnrichmentResult<P>) -> Result<&P, &'static str> {
    match (&result.state, &result.payload) {
        (EnrichmentState::Ready, Some(payload)) => Ok(payload),
        (EnrichmentState::Loading, _) => Err("loading…"),
        (EnrichmentState::Unavailable, _) | (EnrichmentState::Ready, None) => Err("unavailable"),
        (EnrichmentState::Idle, _) => Err("-"),
    }
}
