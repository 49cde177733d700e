//! Generation-counted dispatch and arbitration for one enrichment kind.
//!
//! Every identity change allocates a new generation. The lookup started for
//! it carries that number, and its outcome is committed only if the
//! dispatcher is still on the same generation when it settles. Everything runs
//! on one thread (`spawn_local`), so the check and the commit cannot be
//! interleaved with another identity change.

use crate::enrichment::{AlbumInfo, Artwork, EnrichmentKind, EnrichmentResult, LyricsAnalysis};
use crate::events::{EnrichmentEventEmitter, EnrichmentEventSender};
use crate::identity::IdentityObserver;
use crate::providers::EnrichmentProvider;
use crate::track::{TrackIdentity, TrackSnapshot};
use crate::Result;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::watch;

/// What [`GenerationDispatcher::observe`] did with an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Same identity as last time (e.g. play/pause); nothing happened.
    Unchanged,
    /// Nothing is playing; the result was reset to idle.
    Cleared { generation: u64 },
    /// A lookup tagged with `generation` was started.
    Started { generation: u64 },
}

pub type ArtworkDispatcher = GenerationDispatcher<dyn EnrichmentProvider<Payload = Artwork>>;
pub type AlbumInfoDispatcher = GenerationDispatcher<dyn EnrichmentProvider<Payload = AlbumInfo>>;
pub type LyricsDispatcher = GenerationDispatcher<dyn EnrichmentProvider<Payload = LyricsAnalysis>>;

pub struct GenerationDispatcher<P: EnrichmentProvider + ?Sized> {
    provider: Rc<P>,
    state: Rc<DispatchState<P::Payload>>,
}

struct DispatchState<T> {
    kind: EnrichmentKind,
    generation: Cell<u64>,
    last_seen: RefCell<Option<TrackIdentity>>,
    result: watch::Sender<EnrichmentResult<T>>,
    events: Option<EnrichmentEventSender>,
}

impl<T> DispatchState<T> {
    /// Commit `outcome` if `generation` is still current, otherwise drop it.
    fn settle(&self, generation: u64, outcome: Result<Option<T>>) {
        if let Err(e) = &outcome {
            log::warn!("{} lookup for generation {generation} failed: {e}", self.kind);
        }

        let current = self.generation.get();
        if generation != current {
            log::debug!(
                "Discarding stale {} response for generation {generation} (current {current})",
                self.kind
            );
            self.events.emit_discarded(self.kind, generation, current);
            return;
        }

        let result = match outcome {
            Ok(Some(payload)) => EnrichmentResult::ready(generation, payload),
            Ok(None) => {
                log::info!("No {} available for generation {generation}", self.kind);
                EnrichmentResult::unavailable(generation)
            }
            Err(_) => EnrichmentResult::unavailable(generation),
        };

        self.events.emit_committed(self.kind, generation, result.state);
        self.result.send_replace(result);
    }
}

impl<P: EnrichmentProvider + ?Sized + 'static> GenerationDispatcher<P> {
    pub fn new(provider: Rc<P>, events: Option<EnrichmentEventSender>) -> Self {
        let (result, _rx) = watch::channel(EnrichmentResult::default());
        let state = DispatchState {
            kind: provider.kind(),
            generation: Cell::new(0),
            last_seen: RefCell::new(None),
            result,
            events,
        };

        Self {
            provider,
            state: Rc::new(state),
        }
    }

    pub fn kind(&self) -> EnrichmentKind {
        self.state.kind
    }

    /// The latest generation allocated. Starts at 0.
    pub fn generation(&self) -> u64 {
        self.state.generation.get()
    }

    pub fn last_identity(&self) -> Option<TrackIdentity> {
        self.state.last_seen.borrow().clone()
    }

    /// A copy of the current result.
    pub fn result(&self) -> EnrichmentResult<P::Payload> {
        self.state.result.borrow().clone()
    }

    /// Read-only view of the result that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<EnrichmentResult<P::Payload>> {
        self.state.result.subscribe()
    }

    /// React to a published identity.
    ///
    /// `track` must be the snapshot `identity` was derived from.
    ///
    /// # Panics
    ///
    /// Starting a lookup uses [`tokio::task::spawn_local`], so this must be
    /// called from inside a [`tokio::task::LocalSet`].
    pub fn observe(&self, identity: Option<&TrackIdentity>, track: Option<&TrackSnapshot>) -> Dispatch {
        if self.state.last_seen.borrow().as_ref() == identity {
            return Dispatch::Unchanged;
        }
        self.state.last_seen.replace(identity.cloned());

        let kind = self.state.kind;
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);

        let (Some(identity), Some(track)) = (identity, track) else {
            log::debug!("{kind}: nothing playing, cleared at generation {generation}");
            self.state.result.send_replace(EnrichmentResult::idle(generation));
            self.state.events.emit_cleared(kind, generation);
            return Dispatch::Cleared { generation };
        };

        log::info!("{kind}: dispatching generation {generation} for {identity}");
        self.state.result.send_replace(EnrichmentResult::loading(generation));
        self.state
            .events
            .emit_dispatched(kind, generation, &identity.title, &identity.artist);

        let provider = Rc::clone(&self.provider);
        let state = Rc::clone(&self.state);
        let track = track.clone();
        tokio::task::spawn_local(async move {
            let outcome = provider.fetch(&track).await;
            state.settle(generation, outcome);
        });

        Dispatch::Started { generation }
    }
}

impl<P: EnrichmentProvider + ?Sized + 'static> IdentityObserver for GenerationDispatcher<P> {
    fn identity_published(&self, identity: Option<&TrackIdentity>, track: Option<&TrackSnapshot>) {
        self.observe(identity, track);
    }
}
