//! # liner-notes
//!
//! Polls the local media player and enriches whatever is playing with cover
//! art, album context and a lyrics interpretation.
//!
//! The core is single-threaded and lock-free: a [`Poller`] queries the
//! [`TrackSource`] on a fixed period, the [`IdentityResolver`] turns every
//! snapshot into a `(title, artist)` identity, and one [`GenerationDispatcher`]
//! per enrichment kind issues a lookup whenever that identity changes. Each
//! lookup is tagged with a generation number and only the latest generation
//! may commit, so a slow response for a track you already skipped can never
//! overwrite the current one.
//!
//! [`NowPlaying`] wires all of this together.

pub mod cancel;
pub mod config;
pub mod dispatcher;
pub mod enrichment;
pub mod error;
pub mod events;
mod headers;
pub mod identity;
pub mod now_playing;
pub mod poller;
pub mod providers;
pub mod source;
pub mod track;

pub use cancel::CancellationState;
pub use config::Settings;
pub use dispatcher::{
    AlbumInfoDispatcher, ArtworkDispatcher, Dispatch, GenerationDispatcher, LyricsDispatcher,
};
pub use enrichment::{AlbumInfo, Artwork, EnrichmentKind, EnrichmentResult, EnrichmentState, LyricsAnalysis};
pub use error::LinerNotesError;
pub use events::{
    create_enrichment_channel, EnrichmentEvent, EnrichmentEventReceiver, EnrichmentEventSender,
};
pub use identity::{IdentityObserver, IdentityResolver};
pub use now_playing::{DisplayState, NowPlaying, Providers};
pub use poller::{Poller, SnapshotSink, DEFAULT_POLL_INTERVAL};
pub use providers::EnrichmentProvider;
pub use source::{CommandTrackSource, SourceKind, TrackSource};
pub use track::{TrackIdentity, TrackSnapshot};

#[cfg(feature = "mock")]
pub use source::MockTrackSource;

pub type Result<T> = std::result::Result<T, LinerNotesError>;
