// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use fixedbitset::FixedBitSet;
use indexmap::IndexMap;

use crate::{InstanceId, SiteId};

/// Error type describing why a slot cannot be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    /// The slot index is not below the bucket capacity.
    OutOfRange { slot: u32, capacity: u32 },
    /// The slot is already taken by another instance.
    Occupied { slot: u32, occupant: InstanceId },
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimError::OutOfRange { slot, capacity } => write!(
                f,
                "slot {slot} is outside available range [0..{capacity})"
            ),
            ClaimError::Occupied { slot, occupant } => {
                write!(f, "slot {slot} is already occupied by instance {occupant}")
            }
        }
    }
}

impl std::error::Error for ClaimError {}

/// Slots of one site for one resource.
#[derive(Debug, Clone)]
pub struct SlotBucket {
    taken: FixedBitSet,
    occupants: Vec<Option<InstanceId>>,
}

impl SlotBucket {
    pub fn new(capacity: u32) -> Self {
        SlotBucket {
            taken: FixedBitSet::with_capacity(capacity as usize),
            occupants: vec![None; capacity as usize],
        }
    }

    pub fn capacity(&self) -> u32 {
        self.occupants.len() as u32
    }

    /// Number of occupied slots.
    pub fn len(&self) -> u32 {
        self.taken.count_ones(..) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn free(&self) -> u32 {
        self.capacity() - self.len()
    }

    /// Records `occupant` in `slot`. Fails without mutation if the slot is out
    /// of range or already taken.
    pub fn claim(&mut self, slot: u32, occupant: InstanceId) -> Result<(), ClaimError> {
        if slot >= self.capacity() {
            return Err(ClaimError::OutOfRange {
                slot,
                capacity: self.capacity(),
            });
        }
        if let Some(existing) = self.occupants[slot as usize] {
            return Err(ClaimError::Occupied {
                slot,
                occupant: existing,
            });
        }
        self.taken.insert(slot as usize);
        self.occupants[slot as usize] = Some(occupant);
        Ok(())
    }

    pub fn occupied(&self, slot: u32) -> bool {
        (slot as usize) < self.taken.len() && self.taken.contains(slot as usize)
    }

    pub fn get(&self, slot: u32) -> Option<InstanceId> {
        self.occupants.get(slot as usize).copied().flatten()
    }

    /// Lowest empty slot, or `None` if the bucket is full.
    pub fn first_free_slot(&self) -> Option<u32> {
        self.taken.zeroes().next().map(|slot| slot as u32)
    }
}

/// Slot buckets of every site touched during one legalization run. Buckets
/// are created on first use, all with the same capacity.
#[derive(Debug, Clone)]
pub struct SiteOccupancy {
    capacity: u32,
    buckets: IndexMap<SiteId, SlotBucket>,
}

impl SiteOccupancy {
    pub fn new(capacity: u32) -> Self {
        SiteOccupancy {
            capacity,
            buckets: IndexMap::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn bucket(&self, site: SiteId) -> Option<&SlotBucket> {
        self.buckets.get(&site)
    }

    pub fn bucket_mut(&mut self, site: SiteId) -> &mut SlotBucket {
        let capacity = self.capacity;
        self.buckets
            .entry(site)
            .or_insert_with(|| SlotBucket::new(capacity))
    }

    pub fn claim(
        &mut self,
        site: SiteId,
        slot: u32,
        occupant: InstanceId,
    ) -> Result<(), ClaimError> {
        self.bucket_mut(site).claim(slot, occupant)
    }

    /// Claims the lowest free slot of `site` and returns it.
    pub fn claim_first_free(&mut self, site: SiteId, occupant: InstanceId) -> Option<u32> {
        let bucket = self.bucket_mut(site);
        let slot = bucket.first_free_slot()?;
        bucket
            .claim(slot, occupant)
            .unwrap_or_else(|err| panic!("First free slot of site {site} rejected claim: {err}"));
        Some(slot)
    }

    /// Free slots at `site`; untouched sites are entirely free.
    pub fn free(&self, site: SiteId) -> u32 {
        self.buckets
            .get(&site)
            .map_or(self.capacity, |bucket| bucket.free())
    }

    pub fn num_sites(&self) -> usize {
        self.buckets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SiteId, &SlotBucket)> {
        self.buckets.iter().map(|(site, bucket)| (*site, bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_and_query() {
        let mut bucket = SlotBucket::new(3);
        assert_eq!(bucket.first_free_slot(), Some(0));
        assert!(bucket.claim(1, InstanceId(7)).is_ok());
        assert!(bucket.occupied(1));
        assert!(!bucket.occupied(0));
        assert!(!bucket.occupied(9));
        assert_eq!(bucket.get(1), Some(InstanceId(7)));
        assert_eq!(bucket.get(2), None);
        assert_eq!(bucket.get(5), None);
        assert_eq!(bucket.first_free_slot(), Some(0));
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.free(), 2);
    }

    #[test]
    fn double_occupancy_is_rejected_without_mutation() {
        let mut bucket = SlotBucket::new(2);
        bucket.claim(0, InstanceId(1)).unwrap();
        assert_eq!(
            bucket.claim(0, InstanceId(2)),
            Err(ClaimError::Occupied {
                slot: 0,
                occupant: InstanceId(1)
            })
        );
        assert_eq!(bucket.get(0), Some(InstanceId(1)));
        assert_eq!(bucket.len(), 1);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut bucket = SlotBucket::new(2);
        let err = bucket.claim(2, InstanceId(0)).unwrap_err();
        assert_eq!(
            err,
            ClaimError::OutOfRange {
                slot: 2,
                capacity: 2
            }
        );
        assert_eq!(err.to_string(), "slot 2 is outside available range [0..2)");
        assert!(bucket.is_empty());
    }

    #[test]
    fn full_bucket_has_no_free_slot() {
        let mut bucket = SlotBucket::new(2);
        bucket.claim(1, InstanceId(0)).unwrap();
        bucket.claim(0, InstanceId(1)).unwrap();
        assert_eq!(bucket.first_free_slot(), None);
        assert_eq!(bucket.free(), 0);
    }

    #[test]
    fn sites_are_created_lazily() {
        let mut occupancy = SiteOccupancy::new(4);
        assert_eq!(occupancy.num_sites(), 0);
        assert_eq!(occupancy.free(SiteId(3)), 4);
        assert!(occupancy.bucket(SiteId(3)).is_none());

        occupancy.claim(SiteId(3), 0, InstanceId(0)).unwrap();
        occupancy.claim(SiteId(3), 2, InstanceId(1)).unwrap();
        assert_eq!(occupancy.num_sites(), 1);
        assert_eq!(occupancy.free(SiteId(3)), 2);
        assert_eq!(occupancy.bucket(SiteId(3)).unwrap().capacity(), 4);

        assert_eq!(occupancy.claim_first_free(SiteId(3), InstanceId(2)), Some(1));
        assert_eq!(occupancy.claim_first_free(SiteId(3), InstanceId(3)), Some(3));
        assert_eq!(occupancy.claim_first_free(SiteId(3), InstanceId(4)), None);
        assert_eq!(occupancy.num_sites(), 1);
    }
}
