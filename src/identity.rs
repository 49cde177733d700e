//! Track identity resolution and fan-out.
//!
//! The resolver turns every published snapshot into an identity and hands it
//! to each subscribed observer. It does not deduplicate: observers compare the
//! identity with the last one they saw, so a late subscriber still gets a
//! consistent view.

use crate::track::{TrackIdentity, TrackSnapshot};
use std::rc::Rc;

/// Derive the identity of a snapshot. `None` in, `None` out.
pub fn resolve(snapshot: Option<&TrackSnapshot>) -> Option<TrackIdentity> {
    snapshot.map(TrackSnapshot::identity)
}

/// Receives every identity the resolver publishes.
///
/// `track` is the snapshot the identity was derived from; it carries the
/// fields (such as `album`) that are not part of the identity.
pub trait IdentityObserver {
    fn identity_published(&self, identity: Option<&TrackIdentity>, track: Option<&TrackSnapshot>);
}

#[derive(Default)]
pub struct IdentityResolver {
    observers: Vec<Rc<dyn IdentityObserver>>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Rc<dyn IdentityObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Resolve `snapshot` and notify every observer, in subscription order.
    pub fn publish(&self, snapshot: Option<&TrackSnapshot>) -> Option<TrackIdentity> {
        let identity = resolve(snapshot);
        for observer in &self.observers {
            observer.identity_published(identity.as_ref(), snapshot);
        }
        identity
    }
}
