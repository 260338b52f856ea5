//! Point-in-time copies of a collection
//!
//! A snapshot captures every owner and the detached list so that a failed batch
//! can be rolled back by the caller. The encoded graph carries a SHA-256
//! checksum that is verified before anything is restored.

use crate::collection::Collection;
use crate::error::{Result, StashError};
use crate::item::Item;
use crate::owner::Owner;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

/// Encoded owner graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Human-readable label
    pub label: String,

    /// Number of owners captured
    pub owner_count: usize,

    /// bincode of (owners, detached)
    data: Vec<u8>,

    /// SHA-256 of `data`
    checksum: [u8; 32],
}

impl Snapshot {
    fn capture(label: &str, owners: &[Owner], detached: &[Item]) -> Result<Self> {
        let data = bincode::serialize(&(owners, detached))?;
        Ok(Snapshot {
            label: label.to_string(),
            owner_count: owners.len(),
            checksum: digest(&data),
            data,
        })
    }

    /// Check the stored checksum against the data
    pub fn verify(&self) -> bool {
        digest(&self.data) == self.checksum
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    fn decode(&self) -> Result<(Vec<Owner>, Vec<Item>)> {
        if !self.verify() {
            return Err(StashError::ChecksumMismatch);
        }
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Serialize the snapshot itself, for callers that keep it outside memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        if !snapshot.verify() {
            return Err(StashError::ChecksumMismatch);
        }
        Ok(snapshot)
    }
}

fn digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

impl Collection {
    /// Capture the owner graph
    pub fn snapshot(&self, label: &str) -> Result<Snapshot> {
        let (owners, detached) = self.graph();
        Snapshot::capture(label, owners, detached)
    }

    /// Replace the owner graph with a snapshot's
    ///
    /// Nothing changes if the checksum does not match.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        let (owners, detached) = snapshot.decode()?;
        info!(
            "Restoring snapshot '{}' ({} owners, {} bytes)",
            snapshot.label,
            owners.len(),
            snapshot.size_bytes()
        );
        self.replace_graph(owners, detached);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Position;
    use crate::item::{ItemId, StorageType};
    use crate::layout::FormatVersion;
    use crate::owner::Character;

    fn collection() -> Collection {
        let item = Item::builder(ItemId(1), "cap")
            .footprint(2, 2)
            .stored(StorageType::Inventory, Position::new(0, 0))
            .build()
            .unwrap();
        Collection::builder()
            .owner(Owner::Character(
                Character::new("Sorc", FormatVersion::LEGACY).with_items(vec![item]),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_snapshot_restore() {
        let mut collection = collection();
        let snapshot = collection.snapshot("before").unwrap();
        assert!(snapshot.verify());
        assert_eq!(snapshot.owner_count, 1);

        collection.detach(ItemId(1)).unwrap();
        assert_eq!(collection.owners()[0].item_count(), 0);

        collection.restore(&snapshot).unwrap();
        assert_eq!(collection.owners()[0].item_count(), 1);
        assert!(collection.detached().is_empty());
    }

    #[test]
    fn test_corrupted_snapshot_rejected() {
        let mut collection = collection();
        let mut snapshot = collection.snapshot("before").unwrap();
        snapshot.data[0] ^= 0xFF;

        assert!(!snapshot.verify());
        assert!(matches!(
            collection.restore(&snapshot),
            Err(StashError::ChecksumMismatch)
        ));
        assert_eq!(collection.owners()[0].item_count(), 1);
    }

    #[test]
    fn test_bytes_round_trip() {
        let snapshot = collection().snapshot("disk").unwrap();
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snapshot);
    }
}
