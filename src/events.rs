//! # Enrichment Events
//!
//! This module provides a broadcast channel system for emitting dispatch and
//! arbitration events that consumers can listen to, for example to log which
//! responses were dropped as stale.

use crate::enrichment::{EnrichmentKind, EnrichmentState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the generation dispatchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnrichmentEvent {
    /// A new generation was allocated and its lookup started.
    Dispatched {
        timestamp: DateTime<Utc>,
        kind: EnrichmentKind,
        generation: u64,
        title: String,
        artist: String,
    },
    /// Nothing is playing any more; the result was reset to idle.
    Cleared {
        timestamp: DateTime<Utc>,
        kind: EnrichmentKind,
        generation: u64,
    },
    /// A lookup settled while its generation was still current.
    Committed {
        timestamp: DateTime<Utc>,
        kind: EnrichmentKind,
        generation: u64,
        /// Either `Ready` or `Unavailable`
        state: EnrichmentState,
    },
    /// A lookup settled after its generation had been superseded.
    Discarded {
        timestamp: DateTime<Utc>,
        kind: EnrichmentKind,
        /// The generation the response was tagged with
        generation: u64,
        /// The dispatcher's generation when the response arrived
        current_generation: u64,
    },
}

impl EnrichmentEvent {
    pub fn kind(&self) -> EnrichmentKind {
        match self {
            Self::Dispatched { kind, .. }
            | Self::Cleared { kind, .. }
            | Self::Committed { kind, .. }
            | Self::Discarded { kind, .. } => *kind,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Self::Dispatched { generation, .. }
            | Self::Cleared { generation, .. }
            | Self::Committed { generation, .. }
            | Self::Discarded { generation, .. } => *generation,
        }
    }
}

/// A handle for receiving enrichment events.
///
/// # Examples
///
/// ```rust,no_run
/// use liner_notes::{EnrichmentEvent, EnrichmentEventReceiver};
/// use tokio::sync::broadcast::error::RecvError;
///
/// async fn watch(mut events: EnrichmentEventReceiver) {
///     loop {
///         match events.recv().await {
///             Ok(EnrichmentEvent::Discarded { kind, generation, current_generation, .. }) => {
///                 println!("{kind}: dropped generation {generation}, now at {current_generation}");
///             }
///             Ok(_) => {}
///             Err(RecvError::Lagged(skipped)) => println!("{skipped} events skipped"),
///             Err(RecvError::Closed) => break,
///         }
///     }
/// }
/// ```
pub type EnrichmentEventReceiver = broadcast::Receiver<EnrichmentEvent>;

/// A handle for sending enrichment events.
pub type EnrichmentEventSender = broadcast::Sender<EnrichmentEvent>;

/// Creates a new broadcast channel for enrichment events.
///
/// The channel has a default capacity of 100 events.
pub fn create_enrichment_channel() -> (EnrichmentEventSender, EnrichmentEventReceiver) {
    broadcast::channel(100)
}

/// Helper trait for emitting enrichment events through an optional sender.
pub trait EnrichmentEventEmitter {
    fn emit_dispatched(&self, kind: EnrichmentKind, generation: u64, title: &str, artist: &str);

    fn emit_cleared(&self, kind: EnrichmentKind, generation: u64);

    fn emit_committed(&self, kind: EnrichmentKind, generation: u64, state: EnrichmentState);

    fn emit_discarded(&self, kind: EnrichmentKind, generation: u64, current_generation: u64);
}

impl EnrichmentEventEmitter for Option<EnrichmentEventSender> {
    fn emit_dispatched(&self, kind: EnrichmentKind, generation: u64, title: &str, artist: &str) {
        if let Some(sender) = self {
            let event = EnrichmentEvent::Dispatched {
                timestamp: Utc::now(),
                kind,
                generation,
                title: title.to_string(),
                artist: artist.to_string(),
            };
            let _ = sender.send(event); // Ignore send errors (no receivers)
        }
    }

    fn emit_cleared(&self, kind: EnrichmentKind, generation: u64) {
        if let Some(sender) = self {
            let event = EnrichmentEvent::Cleared {
                timestamp: Utc::now(),
                kind,
                generation,
            };
            let _ = sender.send(event); // Ignore send errors (no receivers)
        }
    }

    fn emit_committed(&self, kind: EnrichmentKind, generation: u64, state: EnrichmentState) {
        if let Some(sender) = self {
            let event = EnrichmentEvent::Committed {
                timestamp: Utc::now(),
                kind,
                generation,
                state,
            };
            let _ = sender.send(event); // Ignore send errors (no receivers)
        }
    }

    fn emit_discarded(&self, kind: EnrichmentKind, generation: u64, current_generation: u64) {
        if let Some(sender) = self {
            let event = EnrichmentEvent::Discarded {
                timestamp: Utc::now(),
                kind,
                generation,
                current_generation,
            };
            let _ = sender.send(event); // Ignore send errors (no receivers)
        }
    }
}
