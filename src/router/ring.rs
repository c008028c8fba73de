//! Consistent-hash ring.
//!
//! Every member id is hashed onto the `u64` space at `replicas` virtual
//! points. The owner of a key is the member whose first point lies at or
//! past `hash(key)`, wrapping to the lowest point when the search runs off
//! the end. Virtual points keep the key space evenly spread even with a
//! handful of members.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

/// Default number of virtual points per member.
pub const DEFAULT_REPLICAS: usize = 20;

#[derive(Debug, Clone)]
pub struct HashRing {
    replicas: usize,
    points: BTreeMap<u64, String>,
    members: BTreeSet<String>,
}

impl HashRing {
    pub fn new(replicas: usize) -> Self {
        HashRing {
            replicas: replicas.max(1),
            points: BTreeMap::new(),
            members: BTreeSet::new(),
        }
    }

    fn hash_of(value: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    /// Inserts a member. Re-adding an existing member is a no-op.
    pub fn add(&mut self, id: &str) {
        if !self.members.insert(id.to_string()) {
            return;
        }
        for replica in 0..self.replicas {
            let point = Self::hash_of(&format!("{}#{}", id, replica));
            self.points.insert(point, id.to_string());
        }
    }

    /// Removes a member and all its virtual points.
    pub fn remove(&mut self, id: &str) {
        if !self.members.remove(id) {
            return;
        }
        for replica in 0..self.replicas {
            let point = Self::hash_of(&format!("{}#{}", id, replica));
            if self.points.get(&point).map(String::as_str) == Some(id) {
                self.points.remove(&point);
            }
        }
    }

    /// The member owning `key`: first point at or past `hash(key)`,
    /// wrapping. `None` on an empty ring.
    pub fn owner(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let h = Self::hash_of(key);
        self.points
            .range(h..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, id)| id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Member ids in sorted order.
    pub fn members(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        HashRing::new(DEFAULT_REPLICAS)
    }
}
