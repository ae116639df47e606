//! A fixed-size transposition table for the alpha-beta search.

/// How a stored value relates to the true value of the position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// The true value is at least the stored value
    Lower,
    /// The true value is at most the stored value
    Upper,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<M> {
    hash: u64,
    pub depth: u16,
    pub value: i32,
    pub bound: Bound,
    pub best_move: Option<M>,
}

impl<M> Entry<M> {
    /// Whether the stored value decides the search of a node with the given window.
    /// Returns the value to use if it does.
    pub fn cutoff_value(&self, depth: u16, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth != depth {
            return None;
        }
        match self.bound {
            Bound::Exact => Some(self.value),
            Bound::Lower if self.value >= beta => Some(self.value),
            Bound::Upper if self.value <= alpha => Some(self.value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Bucket<M> {
    entries: [Option<Entry<M>>; 4],
}

impl<M> Default for Bucket<M> {
    fn default() -> Self {
        Bucket {
            entries: [None, None, None, None],
        }
    }
}

impl<M> Bucket<M> {
    fn insert(&mut self, new_entry: Entry<M>) {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|entry| entry.as_ref().is_some_and(|entry| entry.hash == new_entry.hash))
        {
            *slot = Some(new_entry);
            return;
        }

        // Shallow entries are the cheapest to recompute
        let lowest_pri_entry = self
            .entries
            .iter_mut()
            .min_by_key(|entry| entry.as_ref().map_or(-1, |entry| entry.depth as i32));
        if let Some(slot) = lowest_pri_entry {
            if slot
                .as_ref()
                .map_or(true, |entry| entry.depth <= new_entry.depth)
            {
                *slot = Some(new_entry);
            }
        }
    }
}

pub struct TranspositionTable<M> {
    buckets: Vec<Bucket<M>>,
}

impl<M: Clone> TranspositionTable<M> {
    /// Creates a table with room for at least `entries` entries
    pub fn new(entries: usize) -> Self {
        let num_buckets = entries.div_ceil(4).max(1);
        TranspositionTable {
            buckets: (0..num_buckets).map(|_| Bucket::default()).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len() * 4
    }

    pub fn used_entries(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.entries.iter())
            .flatten()
            .count()
    }

    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = Bucket::default();
        }
    }

    pub fn get(&self, hash: u64) -> Option<&Entry<M>> {
        let bucket = &self.buckets[self.index(hash)];
        bucket.entries.iter().flatten().find(|entry| entry.hash == hash)
    }

    pub fn insert(&mut self, hash: u64, depth: u16, value: i32, bound: Bound, best_move: Option<M>) {
        let index = self.index(hash);
        self.buckets[index].insert(Entry {
            hash,
            depth,
            value,
            bound,
            best_move,
        });
    }

    fn index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }
}

#[test]
fn insert_4_values_test() {
    let mut tt: TranspositionTable<u8> = TranspositionTable::new(4);
    for i in 0..4 {
        let hash = (i << 32) + i;
        tt.insert(hash, 1, i as i32, Bound::Exact, Some(i as u8));
    }
    assert_eq!(tt.used_entries(), 4);

    for i in 0..4 {
        let hash = (i << 32) + i;
        let entry = tt.get(hash).unwrap();
        assert_eq!(entry.value, i as i32);
        assert_eq!(entry.best_move, Some(i as u8));
    }
    assert!(tt.get(17).is_none());
}

#[test]
fn deeper_entries_are_kept_test() {
    let mut tt: TranspositionTable<u8> = TranspositionTable::new(1);
    assert_eq!(tt.capacity(), 4);
    for i in 0..4 {
        tt.insert(i, 10, i as i32, Bound::Exact, None);
    }

    // A full bucket rejects shallower entries
    tt.insert(100, 5, 100, Bound::Exact, None);
    assert!(tt.get(100).is_none());

    // But accepts entries at least as deep, evicting a shallow one
    tt.insert(2, 3, 2, Bound::Exact, None);
    tt.insert(101, 10, 101, Bound::Exact, None);
    assert!(tt.get(2).is_none());
    assert_eq!(tt.get(101).map(|entry| entry.value), Some(101));
    assert_eq!(tt.used_entries(), 4);

    tt.clear();
    assert_eq!(tt.used_entries(), 0);
}

#[test]
fn overwrite_same_position_test() {
    let mut tt: TranspositionTable<u8> = TranspositionTable::new(8);
    tt.insert(42, 6, 3, Bound::Lower, Some(1));
    tt.insert(42, 2, -1, Bound::Upper, Some(2));
    let entry = tt.get(42).unwrap();
    assert_eq!(entry.depth, 2);
    assert_eq!(entry.bound, Bound::Upper);
    assert_eq!(entry.best_move, Some(2));
    assert_eq!(tt.used_entries(), 1);
}

#[test]
fn cutoff_value_test() {
    let mut tt: TranspositionTable<u8> = TranspositionTable::new(8);
    tt.insert(1, 4, 5, Bound::Lower, None);
    tt.insert(2, 4, 5, Bound::Upper, None);
    tt.insert(3, 4, 5, Bound::Exact, None);

    let lower = tt.get(1).unwrap();
    assert_eq!(lower.cutoff_value(4, 0, 5), Some(5));
    assert_eq!(lower.cutoff_value(4, 0, 6), None);
    assert_eq!(lower.cutoff_value(3, 0, 5), None);

    let upper = tt.get(2).unwrap();
    assert_eq!(upper.cutoff_value(4, 5, 10), Some(5));
    assert_eq!(upper.cutoff_value(4, 4, 10), None);

    let exact = tt.get(3).unwrap();
    assert_eq!(exact.cutoff_value(4, i32::MIN, i32::MAX), Some(5));
    assert_eq!(exact.cutoff_value(5, i32::MIN, i32::MAX), None);
}
