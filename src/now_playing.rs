//! The now-playing orchestrator.
//!
//! [`NowPlaying`] owns the poller, the identity resolver, the three
//! enrichment dispatchers and the latest-snapshot cell. Presentation reads
//! from it; only the poller (or [`NowPlaying::publish`]) writes.
//!
//! Everything here is `!Send`: construct and drive it from inside a
//! [`tokio::task::LocalSet`] on a current-thread runtime.
//!
//! ```rust,no_run
//! use liner_notes::{NowPlaying, Settings};
//! use tokio::task::LocalSet;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> liner_notes::Result<()> {
//!     let settings = Settings::load()?;
//!     LocalSet::new()
//!         .run_until(async move {
//!             let now_playing = NowPlaying::from_settings(&settings)?;
//!             now_playing.start();
//!
//!             let mut lyrics = now_playing.lyrics().subscribe();
//!             while lyrics.changed().await.is_ok() {
//!                 println!("{:?}", lyrics.borrow_and_update().state);
//!             }
//!             Ok(())
//!         })
//!         .await
//! }
//! ```

use crate::cancel::CancellationState;
use crate::config::Settings;
use crate::dispatcher::{AlbumInfoDispatcher, ArtworkDispatcher, GenerationDispatcher, LyricsDispatcher};
use crate::enrichment::{AlbumInfo, Artwork, EnrichmentResult, LyricsAnalysis};
use crate::events::{create_enrichment_channel, EnrichmentEventReceiver, EnrichmentEventSender};
use crate::identity::{IdentityObserver, IdentityResolver};
use crate::poller::{Poller, SnapshotSink};
use crate::providers::{
    AlbumInfoProvider, ApiHttp, ArtworkProvider, ClaudeClient, EnrichmentProvider, GeniusClient,
    ItunesClient, LyricsAnalysisProvider,
};
use crate::source::TrackSource;
use crate::track::TrackSnapshot;
use crate::Result;
use http_client::HttpClient;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One provider per enrichment kind.
pub struct Providers {
    pub artwork: Rc<dyn EnrichmentProvider<Payload = Artwork>>,
    pub album_info: Rc<dyn EnrichmentProvider<Payload = AlbumInfo>>,
    pub lyrics: Rc<dyn EnrichmentProvider<Payload = LyricsAnalysis>>,
}

impl Providers {
    /// The iTunes/Genius/Claude providers, all sharing `client`.
    ///
    /// Missing API keys are not an error here: the affected providers fail
    /// each lookup, which shows up as `Unavailable`.
    pub fn from_settings(settings: &Settings, client: Arc<dyn HttpClient>) -> Self {
        let http = ApiHttp::new(client, settings.http_timeout());
        let itunes = ItunesClient::with_base_url(http.clone(), settings.endpoints.itunes.clone());
        let genius = settings.api.genius_token.as_ref().map(|token| {
            GeniusClient::with_base_url(http.clone(), token.clone(), settings.endpoints.genius.clone())
        });
        let claude = settings.api.anthropic_key.as_ref().map(|key| {
            ClaudeClient::with_base_url(
                http.clone(),
                key.clone(),
                settings.claude.model.clone(),
                settings.endpoints.anthropic.clone(),
            )
        });

        if !settings.has_keys() {
            log::warn!("api.genius_token or api.anthropic_key missing; album info and lyrics will be unavailable");
        }

        let language = settings.claude.language.clone();
        Self {
            artwork: Rc::new(ArtworkProvider::new(itunes.clone())),
            album_info: Rc::new(
                AlbumInfoProvider::new(itunes, genius.clone(), claude.clone(), language.clone())
                    .with_max_tokens(settings.claude.album_max_tokens),
            ),
            lyrics: Rc::new(
                LyricsAnalysisProvider::new(genius, claude, language)
                    .with_max_tokens(settings.claude.lyrics_max_tokens),
            ),
        }
    }
}

/// Everything presentation needs, copied out in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub track: Option<TrackSnapshot>,
    pub artwork: EnrichmentResult<Artwork>,
    pub album_info: EnrichmentResult<AlbumInfo>,
    pub lyrics: EnrichmentResult<LyricsAnalysis>,
}

impl DisplayState {
    /// "Playing" / "Paused", or `None` when nothing is playing.
    pub fn status_label(&self) -> Option<&'static str> {
        self.track.as_ref().map(TrackSnapshot::status_label)
    }
}

/// Receives snapshots from the poller: stores them, then resolves identity.
struct Core {
    snapshot: watch::Sender<Option<TrackSnapshot>>,
    resolver: IdentityResolver,
}

impl SnapshotSink for Core {
    fn publish(&self, snapshot: Option<TrackSnapshot>) {
        let previous = self.snapshot.borrow().as_ref().map(TrackSnapshot::identity);
        let current = snapshot.as_ref().map(TrackSnapshot::identity);
        if previous != current {
            match &snapshot {
                Some(track) => log::info!("Now playing: {track}"),
                None => log::info!("Nothing playing"),
            }
        }

        // Repeated identical polls must not wake snapshot watchers.
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        self.resolver.publish(snapshot.as_ref());
    }
}

struct Run {
    cancel: CancellationState,
    handle: JoinHandle<()>,
}

pub struct NowPlaying {
    poller: Poller,
    core: Rc<Core>,
    artwork: Rc<ArtworkDispatcher>,
    album_info: Rc<AlbumInfoDispatcher>,
    lyrics: Rc<LyricsDispatcher>,
    events: EnrichmentEventSender,
    run: RefCell<Option<Run>>,
}

impl NowPlaying {
    pub fn new(source: Rc<dyn TrackSource>, providers: Providers, interval: Duration) -> Self {
        let (events, _rx) = create_enrichment_channel();

        let artwork = Rc::new(GenerationDispatcher::new(providers.artwork, Some(events.clone())));
        let album_info = Rc::new(GenerationDispatcher::new(providers.album_info, Some(events.clone())));
        let lyrics = Rc::new(GenerationDispatcher::new(providers.lyrics, Some(events.clone())));

        let mut resolver = IdentityResolver::new();
        resolver.subscribe(artwork.clone() as Rc<dyn IdentityObserver>);
        resolver.subscribe(album_info.clone() as Rc<dyn IdentityObserver>);
        resolver.subscribe(lyrics.clone() as Rc<dyn IdentityObserver>);

        let (snapshot, _rx) = watch::channel(None);

        Self {
            poller: Poller::new(source, interval),
            core: Rc::new(Core { snapshot, resolver }),
            artwork,
            album_info,
            lyrics,
            events,
            run: RefCell::new(None),
        }
    }

    /// Build the configured track source and HTTP providers.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let source = settings.source.build()?;
        log::info!("Reading the player through {}", source.program());

        let client: Arc<dyn HttpClient> = Arc::new(http_client::native::NativeClient::new());
        let providers = Providers::from_settings(settings, client);

        Ok(Self::new(Rc::new(source), providers, settings.poll_interval()))
    }

    /// Start polling. The first query happens right away. No-op when already running.
    ///
    /// # Panics
    ///
    /// Must be called from inside a [`tokio::task::LocalSet`].
    pub fn start(&self) {
        let mut run = self.run.borrow_mut();
        if run.is_some() {
            log::debug!("Poller already running");
            return;
        }

        let cancel = CancellationState::new();
        let sink = self.core.clone() as Rc<dyn SnapshotSink>;
        let handle = self.poller.spawn(sink, cancel.clone());
        *run = Some(Run { cancel, handle });
        log::info!("Polling every {:?}", self.poller.interval());
    }

    /// Stop polling. No tick fires afterwards and an outstanding query will not publish.
    pub fn stop(&self) {
        if let Some(run) = self.run.borrow_mut().take() {
            run.cancel.cancel();
            run.handle.abort();
            log::info!("Polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.borrow().is_some()
    }

    /// Store `snapshot` as the latest and re-evaluate identity.
    ///
    /// This is what the poller calls on every successful query.
    pub fn publish(&self, snapshot: Option<TrackSnapshot>) {
        self.core.publish(snapshot);
    }

    pub fn snapshot(&self) -> Option<TrackSnapshot> {
        self.core.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Option<TrackSnapshot>> {
        self.core.snapshot.subscribe()
    }

    pub fn artwork(&self) -> &ArtworkDispatcher {
        &self.artwork
    }

    pub fn album_info(&self) -> &AlbumInfoDispatcher {
        &self.album_info
    }

    pub fn lyrics(&self) -> &LyricsDispatcher {
        &self.lyrics
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            track: self.snapshot(),
            artwork: self.artwork.result(),
            album_info: self.album_info.result(),
            lyrics: self.lyrics.result(),
        }
    }

    pub fn subscribe_events(&self) -> EnrichmentEventReceiver {
        self.events.subscribe()
    }
}

impl Drop for NowPlaying {
    fn drop(&mut self) {
        self.stop();
    }
}
