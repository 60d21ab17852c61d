use crate::negotiation::{PeerRecord, PeerSnapshot};
use crate::transport::ConnectionKey;
use party_core::PeerId;
use std::collections::HashMap;

/// Owns every live [`PeerRecord`], at most one per peer id.
///
/// Only the party driver touches the registry, so inserts and removals
/// are never observed half-done by another event.
#[derive(Default)]
pub(crate) struct Registry {
    records: HashMap<PeerId, PeerRecord>,
    next_epoch: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates a key for a new connection to `peer_id`.
    pub(crate) fn next_key(&mut self, peer_id: PeerId) -> ConnectionKey {
        self.next_epoch += 1;
        ConnectionKey {
            peer_id,
            epoch: self.next_epoch,
        }
    }

    /// Inserts `record`, handing back whatever it displaced.
    pub(crate) fn insert(&mut self, record: PeerRecord) -> Option<PeerRecord> {
        self.records.insert(record.peer_id().clone(), record)
    }

    pub(crate) fn get(&self, peer_id: &PeerId) -> Option<&PeerRecord> {
        self.records.get(peer_id)
    }

    pub(crate) fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut PeerRecord> {
        self.records.get_mut(peer_id)
    }

    /// The record for `key`, unless it has since been replaced or removed.
    pub(crate) fn current(&self, key: &ConnectionKey) -> Option<&PeerRecord> {
        self.records
            .get(&key.peer_id)
            .filter(|record| record.key().epoch == key.epoch)
    }

    pub(crate) fn current_mut(&mut self, key: &ConnectionKey) -> Option<&mut PeerRecord> {
        self.records
            .get_mut(&key.peer_id)
            .filter(|record| record.key().epoch == key.epoch)
    }

    pub(crate) fn remove(&mut self, key: &ConnectionKey) -> Option<PeerRecord> {
        self.current(key)?;
        self.records.remove(&key.peer_id)
    }

    pub(crate) fn drain(&mut self) -> Vec<PeerRecord> {
        self.records.drain().map(|(_, record)| record).collect()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PeerRecord> {
        self.records.values_mut()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PeerRecord> {
        self.records.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn snapshots(&self) -> Vec<PeerSnapshot> {
        let mut peers: Vec<_> = self.records.values().map(PeerRecord::snapshot).collect();
        peers.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        peers
    }
}
