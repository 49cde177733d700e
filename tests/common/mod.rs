#![allow(dead_code)]

use async_trait::async_trait;
use liner_notes::{
    AlbumInfo, Artwork, EnrichmentKind, EnrichmentProvider, LinerNotesError, LyricsAnalysis,
    Providers, Result, TrackSnapshot,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::oneshot;

pub type Gate<P> = oneshot::Sender<Result<Option<P>>>;

/// A provider whose calls wait on gates handed out by the test, so responses
/// can be released in any order. Calls without a prepared gate build a
/// payload from the track straight away.
pub struct GatedProvider<P> {
    kind: EnrichmentKind,
    make: fn(&TrackSnapshot) -> P,
    calls: RefCell<Vec<TrackSnapshot>>,
    gates: RefCell<VecDeque<oneshot::Receiver<Result<Option<P>>>>>,
}

impl<P> GatedProvider<P> {
    pub fn new(kind: EnrichmentKind, make: fn(&TrackSnapshot) -> P) -> Rc<Self> {
        Rc::new(Self {
            kind,
            make,
            calls: RefCell::new(Vec::new()),
            gates: RefCell::new(VecDeque::new()),
        })
    }

    /// Hold the next call until the returned sender fires.
    pub fn gate(&self) -> Gate<P> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<TrackSnapshot> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl<P: Clone + std::fmt::Debug + 'static> EnrichmentProvider for GatedProvider<P> {
    type Payload = P;

    fn kind(&self) -> EnrichmentKind {
        self.kind
    }

    async fn fetch(&self, track: &TrackSnapshot) -> Result<Option<P>> {
        self.calls.borrow_mut().push(track.clone());
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LinerNotesError::Http("gate dropped".to_string()))),
            None => Ok(Some((self.make)(track))),
        }
    }
}

pub fn artwork_for(track: &TrackSnapshot) -> Artwork {
    Artwork {
        url: format!("https://is1-ssl.mzstatic.com/{}/600x600bb.jpg", track.title),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    }
}

pub fn album_info_for(track: &TrackSnapshot) -> AlbumInfo {
    AlbumInfo {
        release_year: "2013".to_string(),
        genre: "Electronic".to_string(),
        context: format!("{} by {}", track.album, track.artist),
        notable_fact: String::new(),
    }
}

pub fn lyrics_for(track: &TrackSnapshot) -> LyricsAnalysis {
    LyricsAnalysis {
        interpretation: format!("{} is about {}", track.title, track.artist),
    }
}

pub struct Harness {
    pub artwork: Rc<GatedProvider<Artwork>>,
    pub album_info: Rc<GatedProvider<AlbumInfo>>,
    pub lyrics: Rc<GatedProvider<LyricsAnalysis>>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            artwork: GatedProvider::new(EnrichmentKind::Artwork, artwork_for),
            album_info: GatedProvider::new(EnrichmentKind::AlbumInfo, album_info_for),
            lyrics: GatedProvider::new(EnrichmentKind::LyricsAnalysis, lyrics_for),
        }
    }

    pub fn providers(&self) -> Providers {
        Providers {
            artwork: self.artwork.clone(),
            album_info: self.album_info.clone(),
            lyrics: self.lyrics.clone(),
        }
    }
}

pub fn nightcall(is_playing: bool) -> TrackSnapshot {
    TrackSnapshot::new("Nightcall", "Kavinsky", "OutRun", is_playing)
}

pub fn genesis() -> TrackSnapshot {
    TrackSnapshot::new("Genesis", "Grimes", "Art Angels", true)
}

/// Let spawned local tasks run.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
