use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::allocator::Allocator;
use crate::allocator::Global;
use crate::hash_table;
use crate::hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The default hash builder for [`HashMap`].
        pub type DefaultHashBuilder = foldhash::fast::RandomState;

        fn pair_hash<K: Hash, V: Hash>(key: &K, value: &V) -> u64 {
            // A fixed-seed hasher: the per-pair hash must agree between two
            // maps that compare equal, and each map's own builder carries a
            // per-instance seed.
            foldhash::fast::FixedState::default().hash_one((key, value))
        }
    } else {
        /// Fixed-key FNV-1a hasher, used as the default when `foldhash` is
        /// disabled.
        ///
        /// Deterministic and unseeded; prefer the `foldhash` feature when
        /// hash-flooding resistance matters.
        #[derive(Clone)]
        pub struct Fnv1aHasher(u64);

        impl Default for Fnv1aHasher {
            fn default() -> Self {
                Fnv1aHasher(0xcbf2_9ce4_8422_2325)
            }
        }

        impl Hasher for Fnv1aHasher {
            fn write(&mut self, bytes: &[u8]) {
                for &byte in bytes {
                    self.0 ^= u64::from(byte);
                    self.0 = self.0.wrapping_mul(0x100_0000_01b3);
                }
            }

            fn finish(&self) -> u64 {
                self.0
            }
        }

        /// The default hash builder for [`HashMap`].
        pub type DefaultHashBuilder = core::hash::BuildHasherDefault<Fnv1aHasher>;

        fn pair_hash<K: Hash, V: Hash>(key: &K, value: &V) -> u64 {
            let mut hasher = Fnv1aHasher::default();
            key.hash(&mut hasher);
            value.hash(&mut hasher);
            hasher.finish()
        }
    }
}

/// A key-value map built on the open-addressing [`HashTable`].
///
/// `HashMap<K, V, S, A>` stores `(K, V)` entries keyed by `K`, hashing keys
/// with a configurable [`BuildHasher`] `S` and allocating through an injected
/// [`Allocator`] `A`. Every entry is individually allocated with a stable
/// address; the table's grow/shrink policy is described on [`HashTable`].
///
/// Maps compare structurally ([`PartialEq`]) and hash order-independently
/// ([`Hash`]), so a map can itself serve as the key of another map.
///
/// # Examples
///
/// ```rust
/// use quad_hash::HashMap;
///
/// let mut map: HashMap<&str, i32> = HashMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&"a"), Some(&1));
/// assert_eq!(map.remove(&"b"), Some(2));
/// assert_eq!(map.remove(&"b"), None);
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder, A: Allocator = Global> {
    table: HashTable<(K, V), A>,
    hash_builder: S,
}

impl<K, V, S, A> HashMap<K, V, S, A>
where
    S: Default,
    A: Allocator + Default,
{
    /// Creates an empty map using the default hasher builder and allocator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher_in(S::default(), A::default())
    }

    /// Creates an empty map that can hold at least `capacity` entries
    /// without resizing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher_in(capacity, S::default(), A::default())
    }
}

impl<K, V, S, A> Default for HashMap<K, V, S, A>
where
    S: Default,
    A: Allocator + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_hasher_in(hash_builder, Global)
    }

    /// Creates an empty map with the given capacity and hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_hasher_in(capacity, hash_builder, Global)
    }
}

impl<K, V, S, A: Allocator> HashMap<K, V, S, A> {
    /// Creates an empty map that allocates through `alloc`.
    pub fn new_in(alloc: A) -> Self
    where
        S: Default,
    {
        Self::with_hasher_in(S::default(), alloc)
    }

    /// Creates an empty map with the given hasher builder, allocating
    /// through `alloc`.
    pub fn with_hasher_in(hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::new_in(alloc),
            hash_builder,
        }
    }

    /// Creates an empty map with the given capacity and hasher builder,
    /// allocating through `alloc`.
    pub fn with_capacity_and_hasher_in(capacity: usize, hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::with_capacity_in(capacity, alloc),
            hash_builder,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map can hold before growing.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns a reference to the map's allocator.
    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all entries, keeping the allocated bucket array.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Rebuilds the map at the ideal capacity for its current length,
    /// purging tombstones left by removals.
    ///
    /// Purely a maintenance operation; the contents are unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::with_capacity(1000);
    /// for k in 0..10 {
    ///     map.insert(k, k);
    /// }
    ///
    /// map.rehash();
    /// assert_eq!(map.len(), 10);
    /// assert!(map.capacity() < 1000);
    /// ```
    pub fn rehash(&mut self) {
        self.table.rehash();
    }

    /// Reserves capacity for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Returns an iterator over the map's `(&K, &V)` pairs.
    ///
    /// Pairs are yielded in bucket-index order, which is not a function of
    /// insertion order; the only guarantee is that every live entry appears
    /// exactly once.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over `(&K, &mut V)` pairs.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the map's keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the map's values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the map's values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all `(K, V)` pairs.
    ///
    /// The map is empty afterwards, even if the iterator is dropped early.
    pub fn drain(&mut self) -> Drain<'_, K, V, A> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, S, A> HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    /// Inserts a key-value pair into the map.
    ///
    /// On a hit the value is overwritten in place - the entry is not
    /// reallocated, the length is unchanged, and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            hash_table::Entry::Occupied(mut entry) => {
                Some(core::mem::replace(&mut entry.get_mut().1, value))
            }
            hash_table::Entry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the given key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// Removing an absent key is a no-op and returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the given key's entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, u32> = HashMap::new();
    ///
    /// for word in ["a", "b", "a"] {
    ///     *map.entry(word).or_insert(0) += 1;
    /// }
    ///
    /// assert_eq!(map.get(&"a"), Some(&2));
    /// assert_eq!(map.get(&"b"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, A> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            hash_table::Entry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            hash_table::Entry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting the
    /// value produced by `default` on a miss.
    ///
    /// `default` is invoked at most once, and never when the key is already
    /// present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, Vec<u32>> = HashMap::new();
    /// map.get_or_insert_with("evens", Vec::new).push(2);
    /// map.get_or_insert_with("evens", || unreachable!()).push(4);
    ///
    /// assert_eq!(map.get(&"evens"), Some(&vec![2, 4]));
    /// ```
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        match self.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

impl<K, V, S, A> Index<&K> for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    type Output = V;

    /// Unchecked access: the caller asserts the key is present.
    ///
    /// # Panics
    ///
    /// Panics if the key is not in the map. Use
    /// [`get`](HashMap::get) for the checked variant.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, S, A> Debug for HashMap<K, V, S, A>
where
    K: Debug,
    V: Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S, A> PartialEq for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    A: Allocator,
{
    /// Structural equality: same length and every pair of `self` present
    /// with an equal value in `other`.
    ///
    /// Independent of insertion order, removal history, and current
    /// capacity. Each key is re-hashed through `other`'s builder, so the
    /// two maps may carry differently seeded hashers.
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|ov| *ov == *v))
    }
}

impl<K, V, S, A> Eq for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    A: Allocator,
{
}

impl<K, V, S, A> Hash for HashMap<K, V, S, A>
where
    K: Hash,
    V: Hash,
    A: Allocator,
{
    /// Order-independent combined hash.
    ///
    /// XOR-folds a fixed-seed hash of every `(key, value)` pair, so maps
    /// that compare equal hash equal regardless of insertion history,
    /// capacity, or per-map hasher seeds. This is what lets a map serve as
    /// the key of another map.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut acc: u64 = 0;
        for (k, v) in self.iter() {
            acc ^= pair_hash(k, v);
        }
        state.write_u64(acc);
        state.write_usize(self.len());
    }
}

impl<K, V, S, A> Extend<(K, V)> for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S, A> FromIterator<(K, V)> for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// A view into a single entry of a map, either vacant or occupied.
///
/// Constructed by [`HashMap::entry`].
pub enum Entry<'a, K, V, A: Allocator = Global> {
    /// The key is not present.
    Vacant(VacantEntry<'a, K, V, A>),
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, A>),
}

impl<'a, K, V, A: Allocator> Entry<'a, K, V, A> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the value produced by `default` if the entry is vacant and
    /// returns a mutable reference to the value.
    ///
    /// `default` is invoked at most once, and never when the key is already
    /// present.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant map entry, created by [`HashMap::entry`].
pub struct VacantEntry<'a, K, V, A: Allocator = Global> {
    entry: hash_table::VacantEntry<'a, (K, V), A>,
    key: K,
}

impl<'a, K, V, A: Allocator> VacantEntry<'a, K, V, A> {
    /// Returns a reference to the key that would be inserted.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Inserts `value` and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied map entry, created by [`HashMap::entry`].
pub struct OccupiedEntry<'a, K, V, A: Allocator = Global> {
    entry: hash_table::OccupiedEntry<'a, (K, V), A>,
}

impl<'a, K, V, A: Allocator> OccupiedEntry<'a, K, V, A> {
    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Returns a reference to the entry's value.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Returns a mutable reference to the entry's value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference with the map's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Removes the entry and returns its value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry and returns the stored key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// Iterator over a map's `(&K, &V)` pairs, created by [`HashMap::iter`].
pub struct Iter<'a, K, V> {
    inner: hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over a map's `(&K, &mut V)` pairs, created by
/// [`HashMap::iter_mut`].
pub struct IterMut<'a, K, V> {
    inner: hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Iterator over a map's keys, created by [`HashMap::keys`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over a map's values, created by [`HashMap::values`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Iterator over mutable references to a map's values, created by
/// [`HashMap::values_mut`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Draining iterator created by [`HashMap::drain`].
pub struct Drain<'a, K, V, A: Allocator> {
    inner: hash_table::Drain<'a, (K, V), A>,
}

impl<K, V, A: Allocator> Iterator for Drain<'_, K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, A: Allocator> ExactSizeIterator for Drain<'_, K, V, A> {}
impl<K, V, A: Allocator> FusedIterator for Drain<'_, K, V, A> {}

/// Owning iterator created by consuming a map via [`IntoIterator`].
pub struct IntoIter<K, V, A: Allocator> {
    inner: hash_table::IntoIter<(K, V), A>,
}

impl<K, V, A: Allocator> Iterator for IntoIter<K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, A: Allocator> ExactSizeIterator for IntoIter<K, V, A> {}
impl<K, V, A: Allocator> FusedIterator for IntoIter<K, V, A> {}

impl<K, V, S, A: Allocator> IntoIterator for HashMap<K, V, S, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, A>;

    fn into_iter(self) -> IntoIter<K, V, A> {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, A: Allocator> IntoIterator for &'a HashMap<K, V, S, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S, A: Allocator> IntoIterator for &'a mut HashMap<K, V, S, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::hash::Hasher;

    use siphasher::sip::SipHasher;

    use super::*;

    fn sip_hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = SipHasher::new_with_keys(17, 29);
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn insert_then_lookup() {
        let mut map: HashMap<u64, u64> = HashMap::new();
        for k in 0..100u64 {
            assert_eq!(map.insert(k, k), None);
        }
        assert_eq!(map.len(), 100);
        for k in 0..100u64 {
            assert_eq!(map.get(&k), Some(&k));
        }
        assert_eq!(map.get(&100), None);
    }

    #[test]
    fn overwrite_keeps_length_and_returns_old() {
        let mut map: HashMap<&str, i32> = HashMap::new();
        assert_eq!(map.insert("k", 1), None);
        assert_eq!(map.insert("k", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"k"), Some(&2));
    }

    #[test]
    fn remove_present_and_absent() {
        let mut map: HashMap<i32, &str> = HashMap::new();
        map.insert(1, "a");

        assert_eq!(map.remove(&2), None);
        assert_eq!(map.len(), 1);

        assert_eq!(map.remove(&1), Some("a"));
        assert_eq!(map.get(&1), None);
        assert!(map.is_empty());
    }

    #[test]
    fn insert_remove_reinsert_has_no_phantoms() {
        // Tombstones from the first six keys must not linger as phantom
        // entries once fresh keys go in.
        let mut map: HashMap<u64, u64> = HashMap::new();
        for k in 0..6u64 {
            map.insert(k, k);
        }
        for k in 0..6u64 {
            assert_eq!(map.remove(&k), Some(k));
        }
        for k in 6..10u64 {
            map.insert(k, k);
        }

        assert_eq!(map.len(), 4);
        for k in 6..10u64 {
            assert_eq!(map.get(&k), Some(&k));
        }
        for k in 0..6u64 {
            assert_eq!(map.get(&k), None);
        }
    }

    #[test]
    fn empty_after_single_insert_remove() {
        let mut map: HashMap<String, u64> = HashMap::new();
        map.insert("foo".to_string(), 0);
        assert_eq!(map.remove(&"foo".to_string()), Some(0));

        assert!(map.is_empty());
        assert_eq!(map.get(&"foo".to_string()), None);
        assert_eq!(map.remove(&"foo".to_string()), None);

        let never_populated: HashMap<String, u64> = HashMap::new();
        assert_eq!(map, never_populated);
    }

    #[test]
    fn get_or_insert_with_calls_thunk_only_on_miss() {
        let mut map: HashMap<&str, u64> = HashMap::new();
        let calls = Cell::new(0u32);

        let value = map.get_or_insert_with("k", || {
            calls.set(calls.get() + 1);
            7
        });
        assert_eq!(*value, 7);
        assert_eq!(calls.get(), 1);

        let value = map.get_or_insert_with("k", || {
            calls.set(calls.get() + 1);
            99
        });
        assert_eq!(*value, 7);
        assert_eq!(calls.get(), 1, "thunk must not run on a hit");
    }

    #[test]
    fn entry_api() {
        let mut map: HashMap<&str, u64> = HashMap::new();

        assert_eq!(*map.entry("a").or_insert(1), 1);
        assert_eq!(*map.entry("a").or_insert(5), 1);
        assert_eq!(*map.entry("b").or_default(), 0);

        map.entry("a").and_modify(|v| *v += 10);
        assert_eq!(map.get(&"a"), Some(&11));
        map.entry("missing").and_modify(|v| *v += 1);
        assert!(!map.contains_key(&"missing"));

        match map.entry("a") {
            Entry::Occupied(entry) => {
                assert_eq!(entry.key(), &"a");
                assert_eq!(entry.remove(), 11);
            }
            Entry::Vacant(_) => panic!("should be occupied"),
        }
        assert!(!map.contains_key(&"a"));
    }

    #[test]
    fn indexed_access() {
        let mut map: HashMap<&str, i32> = HashMap::new();
        map.insert("present", 3);
        assert_eq!(map[&"present"], 3);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn indexed_access_panics_on_missing_key() {
        let map: HashMap<&str, u64> = HashMap::new();
        let _ = map[&"missing"];
    }

    #[test]
    fn equality_is_order_and_history_independent() {
        let mut a: HashMap<u64, u64> = HashMap::new();
        let mut b: HashMap<u64, u64> = HashMap::with_capacity(500);

        for k in 0..50u64 {
            a.insert(k, k * k);
        }
        // Same pairs via a different history: reversed inserts, full churn,
        // then re-insert.
        for k in (0..50u64).rev() {
            b.insert(k, 0);
        }
        for k in 0..50u64 {
            b.remove(&k);
        }
        for k in (0..50u64).rev() {
            b.insert(k, k * k);
        }

        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(sip_hash_of(&a), sip_hash_of(&b));

        b.insert(0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn combined_hash_ignores_capacity() {
        let mut small: HashMap<u64, u64> = HashMap::new();
        let mut large: HashMap<u64, u64> = HashMap::with_capacity(1000);
        for k in 0..8u64 {
            small.insert(k, k);
            large.insert(k, k);
        }
        assert_eq!(sip_hash_of(&small), sip_hash_of(&large));
    }

    #[test]
    fn maps_nest_as_keys() {
        let mut outer: HashMap<HashMap<u64, u64>, &str> = HashMap::new();

        let mut inner = HashMap::new();
        inner.insert(1, 10);
        inner.insert(2, 20);
        outer.insert(inner, "first");

        // An equal map built in a different order, with its own hasher
        // seed, finds the same entry.
        let mut probe = HashMap::new();
        probe.insert(2, 20);
        probe.insert(1, 10);
        assert_eq!(outer.get(&probe), Some(&"first"));

        probe.insert(3, 30);
        assert_eq!(outer.get(&probe), None);
    }

    #[test]
    fn rehash_preserves_contents() {
        let mut map: HashMap<u64, u64> = HashMap::new();
        for k in 0..60u64 {
            map.insert(k, k + 1);
        }
        for k in 0..30u64 {
            map.remove(&k);
        }

        let len_before = map.len();
        map.rehash();

        assert_eq!(map.len(), len_before);
        for k in 30..60u64 {
            assert_eq!(map.get(&k), Some(&(k + 1)));
        }
    }

    #[test]
    fn keys_and_values_cover_live_entries() {
        let mut map: HashMap<u64, u64> = HashMap::new();
        for k in 0..10u64 {
            map.insert(k, k * 2);
        }
        map.remove(&3);

        let mut keys: Vec<u64> = map.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, [0, 1, 2, 4, 5, 6, 7, 8, 9]);

        let mut values: Vec<u64> = map.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, [0, 2, 4, 8, 10, 12, 14, 16, 18]);

        for v in map.values_mut() {
            *v += 1;
        }
        assert_eq!(map.get(&0), Some(&1));
    }

    #[test]
    fn iteration_yields_each_pair_once() {
        let mut map: HashMap<u64, u64> = HashMap::new();
        for k in 0..20u64 {
            map.insert(k, k);
        }

        let mut seen: Vec<u64> = (&map).into_iter().map(|(k, _)| *k).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());

        for (_, v) in &mut map {
            *v += 1;
        }
        assert_eq!(map.get(&5), Some(&6));

        let mut owned: Vec<(u64, u64)> = map.into_iter().collect();
        owned.sort_unstable();
        assert_eq!(owned.len(), 20);
        assert_eq!(owned[5], (5, 6));
    }

    #[test]
    fn drain_empties_map() {
        let mut map: HashMap<u64, String> = HashMap::new();
        for k in 0..10u64 {
            map.insert(k, k.to_string());
        }

        let drained: Vec<(u64, String)> = map.drain().collect();
        assert_eq!(drained.len(), 10);
        assert!(map.is_empty());

        map.insert(1, "again".to_string());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn extend_and_from_iterator() {
        let map: HashMap<u64, u64> = (0..10u64).map(|k| (k, k)).collect();
        assert_eq!(map.len(), 10);

        let mut map = map;
        map.extend((10..20u64).map(|k| (k, k)));
        assert_eq!(map.len(), 20);
        assert_eq!(map.get(&15), Some(&15));
    }

    #[test]
    fn clone_is_independent() {
        let mut map: HashMap<u64, String> = HashMap::new();
        for k in 0..10u64 {
            map.insert(k, k.to_string());
        }

        let mut copy = map.clone();
        assert_eq!(copy, map);

        copy.insert(0, "changed".to_string());
        assert_eq!(map.get(&0), Some(&"0".to_string()));
        assert_ne!(copy, map);
    }

    #[test]
    fn debug_output_lists_pairs() {
        let mut map: HashMap<u64, u64> = HashMap::new();
        map.insert(1, 2);
        let rendered = alloc::format!("{:?}", map);
        assert_eq!(rendered, "{1: 2}");
    }

    #[test]
    fn length_matches_model_under_churn() {
        let mut map: HashMap<u64, u64> = HashMap::new();
        let mut expected = 0usize;
        for round in 0..5u64 {
            for k in 0..200u64 {
                if map.insert(round * 10_000 + k, k).is_none() {
                    expected += 1;
                }
            }
            for k in (0..200u64).step_by(2) {
                if map.remove(&(round * 10_000 + k)).is_some() {
                    expected -= 1;
                }
            }
            assert_eq!(map.len(), expected);
        }
    }
}
