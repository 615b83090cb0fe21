//! Equivalence-class identity and concurrent count aggregation.

use std::collections::hash_map::Entry;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHasher};

/// Canonical identity of a transcript equivalence class.
///
/// The label is sorted ascending and deduplicated on construction, so two
/// groups built from permutations of the same transcript set compare and
/// hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranscriptGroup {
    txps: Vec<u32>,
}

impl TranscriptGroup {
    pub fn new(mut txps: Vec<u32>) -> Self {
        txps.sort_unstable();
        txps.dedup();
        Self { txps }
    }

    /// Transcript indices in canonical (ascending) order.
    #[inline]
    pub fn label(&self) -> &[u32] {
        &self.txps
    }

    pub fn len(&self) -> usize {
        self.txps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txps.is_empty()
    }
}

/// Aggregated counts for one equivalence class.
#[derive(Debug, Clone, Default)]
pub struct EqClassCounts {
    /// Sum of every UMI count merged into this class.
    pub total: u64,
    /// Barcode index → packed UMI → accumulated count.
    pub barcode_groups: FxHashMap<u32, FxHashMap<u64, u32>>,
}

impl EqClassCounts {
    /// Seed value for a class first observed through a single UMI entry.
    pub fn new(count: u32, barcode: u32, umi: u64) -> Self {
        let mut umis = FxHashMap::default();
        umis.insert(umi, count);
        let mut barcode_groups = FxHashMap::default();
        barcode_groups.insert(barcode, umis);

        Self {
            total: u64::from(count),
            barcode_groups,
        }
    }

    /// Fold one `(barcode, umi, count)` observation into the class.
    ///
    /// Re-observing an existing barcode/UMI pair accumulates additively.
    pub fn merge(&mut self, barcode: u32, umi: u64, count: u32) {
        self.total += u64::from(count);
        let umis = self.barcode_groups.entry(barcode).or_default();
        *umis.entry(umi).or_insert(0) += count;
    }
}

type Shard = FxHashMap<TranscriptGroup, EqClassCounts>;

const SHARD_COUNT: usize = 64;
const DEFAULT_CAPACITY: usize = 1 << 20;

/// Lock-striped map from [`TranscriptGroup`] to [`EqClassCounts`].
///
/// Keys are routed to a shard by hash and every mutation of a key runs under
/// its shard lock, so at most one merge per key is in flight while distinct
/// keys on different shards proceed concurrently. A shard rehash also happens
/// under that shard's lock, never concurrently with reads or writes to it.
#[derive(Debug)]
pub struct EqClassMap {
    shards: Vec<Mutex<Shard>>,
}

impl Default for EqClassMap {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl EqClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for an expected number of distinct classes, spread across the
    /// shards, so a long parse does not rehash mid-stream.
    pub fn with_capacity(classes: usize) -> Self {
        let per_shard = (classes / SHARD_COUNT).max(16);
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(Shard::with_capacity_and_hasher(per_shard, Default::default())))
            .collect();

        Self { shards }
    }

    #[inline]
    fn shard_for(&self, group: &TranscriptGroup) -> &Mutex<Shard> {
        let mut hasher = FxHasher::default();
        group.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) & (SHARD_COUNT - 1)]
    }

    /// Insert `default` when the key is absent, otherwise apply `merge` to
    /// the existing value in place.
    pub fn upsert<F>(&self, key: TranscriptGroup, default: EqClassCounts, merge: F)
    where
        F: FnOnce(&mut EqClassCounts),
    {
        let mut shard = self.shard_for(&key).lock();
        match shard.entry(key) {
            Entry::Occupied(mut entry) => merge(entry.get_mut()),
            Entry::Vacant(entry) => {
                entry.insert(default);
            }
        }
    }

    /// Number of distinct classes across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.lock().is_empty())
    }

    /// Cloning accessor, mostly for inspection and tests.
    pub fn get(&self, key: &TranscriptGroup) -> Option<EqClassCounts> {
        self.shard_for(key).lock().get(key).cloned()
    }

    /// Consume the map, yielding every `(key, counts)` pair. This is the
    /// ownership handoff to the downstream consumer, which becomes the last
    /// owner of the aggregated counts.
    pub fn into_entries(self) -> Vec<(TranscriptGroup, EqClassCounts)> {
        self.shards
            .into_iter()
            .flat_map(|shard| shard.into_inner())
            .collect()
    }
}
