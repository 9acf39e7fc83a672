//! The open-addressing bucket engine.
//!
//! [`HashTable`] stores individually-allocated entries keyed by a caller
//! supplied hash and equality predicate. Collisions are resolved by probing a
//! triangular-number sequence within a power-of-two bucket array; deletions
//! leave tombstones so probe chains stay intact until the next resize purges
//! them. All memory flows through an injected [`Allocator`].

use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

use crate::allocator::Allocator;
use crate::allocator::Global;

/// The smallest bucket array dimension. The table never shrinks below this.
pub const MIN_DIM: usize = 8;

/// Numerator of the grow threshold: the table grows once
/// `used / dim > GROW_NUM / GROW_DEN`.
pub const GROW_NUM: usize = 4;
/// Denominator of the grow threshold.
pub const GROW_DEN: usize = 5;

/// Numerator of the shrink threshold: the table shrinks once
/// `len / dim < SHRINK_NUM / SHRINK_DEN`.
pub const SHRINK_NUM: usize = 1;
/// Denominator of the shrink threshold.
pub const SHRINK_DEN: usize = 8;

/// Factor applied to `dim` on grow and shrink.
pub const GROW_FAC: usize = 4;

// Growing multiplies `dim` by GROW_FAC, so the shrink threshold must sit
// strictly below GROW_RATIO / GROW_FAC or a table sitting at the boundary
// would thrash between grow and shrink on alternating insert/remove.
const _: () = assert!(GROW_FAC * SHRINK_NUM * GROW_DEN < GROW_NUM * SHRINK_DEN);
const _: () = assert!(MIN_DIM.is_power_of_two());

/// Sentinel marking a bucket that has never held an entry.
const HASH_EMPTY: u64 = 0;
/// Sentinel marking a bucket whose entry was removed. Tombstones keep probe
/// chains alive until a resize drops them.
const HASH_DELETED: u64 = 1;
/// Set on every stored hash so a filled marker can never collide with the
/// two sentinel values.
const HASH_FILLED_MARK: u64 = 1 << 63;

/// Applies a 64-bit avalanche finalizer to the raw hash and forces the top
/// bit on.
///
/// The finalizer spreads entropy into the low bits that `hash & mask`
/// actually consumes; the top bit guarantees the result is never
/// `HASH_EMPTY` or `HASH_DELETED`.
#[inline(always)]
fn mix_hash(hash: u64) -> u64 {
    let mut h = hash;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h | HASH_FILLED_MARK
}

/// One slot of the bucket array: a marked hash and an owning pointer to the
/// entry storage. `ptr` is null unless the bucket is filled.
struct Bucket<T> {
    hash: u64,
    ptr: *mut T,
}

impl<T> Bucket<T> {
    const EMPTY: Self = Bucket {
        hash: HASH_EMPTY,
        ptr: core::ptr::null_mut(),
    };

    #[inline(always)]
    fn filled(&self) -> bool {
        self.hash & HASH_FILLED_MARK != 0
    }
}

impl<T> Clone for Bucket<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Bucket<T> {}

/// Returns the first non-filled slot for `hash` along the triangular probe
/// sequence `i, i + 1, i + 3, i + 6, ...` (mod `dim`).
///
/// Always terminates: the load-factor policy keeps at least one non-filled
/// bucket in every table, and a triangular sequence over a power-of-two
/// array visits every index.
#[inline]
fn find_slot_insert<T>(buckets: &[Bucket<T>], mask: usize, hash: u64) -> usize {
    debug_assert!(hash & HASH_FILLED_MARK != 0);
    let mut i = hash as usize & mask;
    let mut j = 0;
    while buckets[i].filled() {
        j += 1;
        i = (i + j) & mask;
    }
    i
}

/// Smallest power-of-two dimension that holds `capacity` entries below the
/// grow threshold.
fn dim_for(capacity: usize) -> usize {
    let needed = capacity.saturating_mul(GROW_DEN).div_ceil(GROW_NUM);
    needed.next_power_of_two().max(MIN_DIM)
}

fn bucket_array_layout<T>(dim: usize) -> Layout {
    Layout::array::<Bucket<T>>(dim).expect("allocation size overflow")
}

/// Allocates a bucket array of `dim` slots through `alloc`, with every slot
/// initialized to `EMPTY`.
fn alloc_buckets<T, A: Allocator>(alloc: &A, dim: usize) -> NonNull<Bucket<T>> {
    let ptr = alloc.allocate(bucket_array_layout::<T>(dim)).cast::<Bucket<T>>();
    // SAFETY: the allocation is valid for `dim` buckets.
    unsafe {
        for i in 0..dim {
            ptr.add(i).write(Bucket::EMPTY);
        }
    }
    ptr
}

/// An open-addressing hash table with tombstone deletion and a
/// hysteresis-driven resize policy.
///
/// `HashTable<T, A>` stores values of type `T` in individually-allocated
/// entries whose addresses stay stable across resizes; only bucket metadata
/// moves. Like a raw table, it requires the caller to provide both the hash
/// value and an equality predicate for each operation - the keyed facade is
/// [`HashMap`](crate::HashMap).
///
/// The bucket array dimension is always a power of two no smaller than
/// [`MIN_DIM`]. The table grows by [`GROW_FAC`] once the load factor reaches
/// [`GROW_NUM`]/[`GROW_DEN`] and shrinks once it falls below
/// [`SHRINK_NUM`]/[`SHRINK_DEN`], with the gap between the thresholds
/// preventing resize oscillation. A grow whose pressure comes from
/// tombstones rather than live entries compacts in place instead of
/// allocating a larger array.
///
/// # Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use quad_hash::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_u64(n: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     n.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table: HashTable<(u64, &str)> = HashTable::new();
///
/// match table.entry(hash_u64(7), |&(k, _)| k == 7) {
///     quad_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert((7, "seven"));
///     }
///     quad_hash::hash_table::Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.find(hash_u64(7), |&(k, _)| k == 7), Some(&(7, "seven")));
/// ```
pub struct HashTable<T, A: Allocator = Global> {
    buckets: NonNull<Bucket<T>>,
    dim: usize,
    used: usize,
    deleted: usize,
    // Lower bound on the first live bucket index. Purely a scan-start hint:
    // lowered on insert, reset to 0 by resize, never recomputed on remove.
    first_used: usize,
    alloc: A,
}

impl<T> HashTable<T> {
    /// Creates an empty table with the minimum bucket dimension, allocating
    /// from the global allocator.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a table that can hold at least `capacity` entries without
    /// resizing, allocating from the global allocator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quad_hash::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T> Default for HashTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> HashTable<T, A> {
    /// Creates an empty table that allocates through `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::with_capacity_in(0, alloc)
    }

    /// Creates a table that can hold at least `capacity` entries without
    /// resizing, allocating through `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        let dim = dim_for(capacity);
        let buckets = alloc_buckets::<T, A>(&alloc, dim);
        Self {
            buckets,
            dim,
            used: 0,
            deleted: 0,
            first_used: dim,
            alloc,
        }
    }

    /// Returns a reference to the table's allocator.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        debug_assert!(self.used >= self.deleted);
        self.used - self.deleted
    }

    /// Returns `true` if the table contains no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries the table can hold before growing.
    pub fn capacity(&self) -> usize {
        self.dim * GROW_NUM / GROW_DEN
    }

    /// Returns the current bucket array dimension.
    ///
    /// Always a power of two no smaller than [`MIN_DIM`].
    pub fn bucket_count(&self) -> usize {
        self.dim
    }

    #[inline(always)]
    fn buckets(&self) -> &[Bucket<T>] {
        // SAFETY: the allocation is valid for `dim` buckets, all initialized.
        unsafe { core::slice::from_raw_parts(self.buckets.as_ptr(), self.dim) }
    }

    /// Walks the probe sequence for `hash` looking for a matching live entry.
    ///
    /// A filled bucket with a matching hash is checked with `eq`. An empty
    /// bucket proves the key was never inserted along this path, because
    /// probing for a given hash always starts at the same index. Tombstones
    /// keep the chain alive and are probed past.
    fn find_slot_lookup(&self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<usize> {
        debug_assert!(hash & HASH_FILLED_MARK != 0);
        let mask = self.dim - 1;
        let buckets = self.buckets();
        let mut i = hash as usize & mask;
        let mut j = 0;
        loop {
            let bucket = &buckets[i];
            if bucket.hash == hash {
                // SAFETY: a filled bucket owns a live entry.
                if eq(unsafe { &*bucket.ptr }) {
                    return Some(i);
                }
            } else if bucket.hash == HASH_EMPTY {
                return None;
            }
            j += 1;
            i = (i + j) & mask;
        }
    }

    /// Returns a reference to the entry matching `hash` and `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use quad_hash::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.entry(hash_u64(1), |&v| v == 1).or_insert(1);
    ///
    /// assert_eq!(table.find(hash_u64(1), |&v| v == 1), Some(&1));
    /// assert_eq!(table.find(hash_u64(2), |&v| v == 2), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl FnMut(&T) -> bool) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let index = self.find_slot_lookup(mix_hash(hash), eq)?;
        // SAFETY: `find_slot_lookup` only returns filled buckets.
        Some(unsafe { &*self.buckets()[index].ptr })
    }

    /// Returns a mutable reference to the entry matching `hash` and `eq`, if
    /// any.
    pub fn find_mut(&mut self, hash: u64, eq: impl FnMut(&T) -> bool) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        let index = self.find_slot_lookup(mix_hash(hash), eq)?;
        // SAFETY: `find_slot_lookup` only returns filled buckets, and the
        // mutable table borrow makes the entry exclusively ours.
        Some(unsafe { &mut *self.buckets()[index].ptr })
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// The returned [`Entry`] either points at the existing value
    /// (`Occupied`) or at the slot where one would be inserted (`Vacant`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use quad_hash::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<String> = HashTable::new();
    /// let hash = hash_str("hello");
    ///
    /// table
    ///     .entry(hash, |s| s == "hello")
    ///     .or_insert_with(|| "hello".to_string());
    ///
    /// match table.entry(hash, |s| s == "hello") {
    ///     quad_hash::hash_table::Entry::Occupied(entry) => {
    ///         assert_eq!(entry.get(), "hello");
    ///     }
    ///     quad_hash::hash_table::Entry::Vacant(_) => unreachable!(),
    /// }
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl FnMut(&T) -> bool) -> Entry<'_, T, A> {
        let hash = mix_hash(hash);
        match self.find_slot_lookup(hash, eq) {
            Some(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            None => {
                let index = find_slot_insert(self.buckets(), self.dim - 1, hash);
                Entry::Vacant(VacantEntry {
                    table: self,
                    hash,
                    index,
                })
            }
        }
    }

    /// Removes and returns the entry matching `hash` and `eq`.
    ///
    /// The bucket is marked with a tombstone so probe chains through it stay
    /// intact; the entry storage is released through the allocator. Removing
    /// an absent key is a no-op that leaves every counter unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use quad_hash::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.entry(hash_u64(42), |&v| v == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(hash_u64(42), |&v| v == 42), Some(42));
    /// assert_eq!(table.remove(hash_u64(42), |&v| v == 42), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl FnMut(&T) -> bool) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let index = self.find_slot_lookup(mix_hash(hash), eq)?;
        Some(self.remove_at(index))
    }

    /// Tombstones the bucket at `index` and destroys its entry.
    fn remove_at(&mut self, index: usize) -> T {
        // SAFETY: `index` is in bounds and the bucket is filled.
        let value = unsafe {
            let bucket = &mut *self.buckets.as_ptr().add(index);
            debug_assert!(bucket.filled());
            bucket.hash = HASH_DELETED;
            let ptr = mem::replace(&mut bucket.ptr, core::ptr::null_mut());
            self.deleted += 1;
            self.alloc.destroy(NonNull::new_unchecked(ptr))
        };
        debug_assert!(self.used >= self.deleted);
        if self.len() * SHRINK_DEN < self.dim * SHRINK_NUM {
            self.shrink();
        }
        value
    }

    /// Grows the table in response to load pressure.
    ///
    /// If purging tombstones alone would bring the load below
    /// `GROW_FAC * SHRINK_NUM / SHRINK_DEN`, the pressure is from tombstones
    /// rather than live entries, and a same-dimension resize (pure
    /// compaction) suffices.
    fn grow(&mut self) {
        if self.len() * SHRINK_DEN < GROW_FAC * self.dim * SHRINK_NUM {
            self.resize(self.dim);
        } else {
            self.resize(self.dim * GROW_FAC);
        }
    }

    fn shrink(&mut self) {
        if self.dim > MIN_DIM {
            self.resize((self.dim / GROW_FAC).max(MIN_DIM));
        }
    }

    /// Replaces the bucket array with a fresh one of `new_dim` slots,
    /// re-placing every filled bucket and dropping tombstones.
    ///
    /// Entries themselves are never moved or reallocated - only the
    /// `{hash, ptr}` metadata is copied - so entry addresses stay stable
    /// across the resize.
    fn resize(&mut self, new_dim: usize) {
        debug_assert!(new_dim.is_power_of_two() && new_dim >= MIN_DIM);

        let new_buckets = alloc_buckets::<T, A>(&self.alloc, new_dim);
        let new_mask = new_dim - 1;
        // SAFETY: the new array is fully initialized to EMPTY and disjoint
        // from the old one.
        let new = unsafe { core::slice::from_raw_parts_mut(new_buckets.as_ptr(), new_dim) };
        for bucket in self.buckets() {
            if bucket.filled() {
                let i = find_slot_insert(new, new_mask, bucket.hash);
                new[i] = *bucket;
            }
        }

        // SAFETY: the old array came from `alloc_buckets` with this layout.
        unsafe {
            self.alloc
                .deallocate(self.buckets.cast(), bucket_array_layout::<T>(self.dim));
        }
        self.buckets = new_buckets;
        self.dim = new_dim;
        self.used -= self.deleted;
        self.deleted = 0;
        self.first_used = 0;
    }

    /// Resizes the table to the ideal dimension for its current length,
    /// purging tombstones and rebalancing memory.
    ///
    /// This is a maintenance operation: it has no observable effect beyond
    /// memory use and probe-chain length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use quad_hash::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(1000);
    /// for k in 0..10u64 {
    ///     table.entry(hash_u64(k), |&v| v == k).or_insert(k);
    /// }
    ///
    /// table.rehash();
    /// assert_eq!(table.len(), 10);
    /// assert!(table.capacity() < 1000);
    /// ```
    pub fn rehash(&mut self) {
        self.resize(dim_for(self.len()));
    }

    /// Reserves capacity for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        let needed = dim_for(self.len().saturating_add(additional));
        if needed > self.dim {
            self.resize(needed);
        }
    }

    /// Removes every entry, releasing entry storage but keeping the bucket
    /// array.
    pub fn clear(&mut self) {
        for i in 0..self.dim {
            // SAFETY: `i` is in bounds; filled buckets own live entries
            // constructed through the allocator.
            unsafe {
                let bucket = &mut *self.buckets.as_ptr().add(i);
                if bucket.filled() {
                    let ptr = mem::replace(&mut bucket.ptr, core::ptr::null_mut());
                    drop(self.alloc.destroy(NonNull::new_unchecked(ptr)));
                }
                bucket.hash = HASH_EMPTY;
            }
        }
        self.used = 0;
        self.deleted = 0;
        self.first_used = self.dim;
    }

    /// Structural equality against another table sharing the same hash
    /// function.
    ///
    /// Probes `other` with `self`'s stored marked hashes, so the result is
    /// independent of insertion order and current capacity. Both tables must
    /// have been populated with the same hash function for the stored hashes
    /// to be comparable.
    pub fn eq_with(&self, other: &Self, mut eq: impl FnMut(&T, &T) -> bool) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        for bucket in &self.buckets()[self.first_used.min(self.dim)..] {
            if bucket.filled() {
                // SAFETY: a filled bucket owns a live entry.
                let entry = unsafe { &*bucket.ptr };
                if other
                    .find_slot_lookup(bucket.hash, |o| eq(entry, o))
                    .is_none()
                {
                    return false;
                }
            }
        }
        true
    }

    /// Returns an iterator over the live entries, in bucket-index order.
    ///
    /// Bucket-index order is not a function of insertion order; the only
    /// guarantee is that every live entry is yielded exactly once.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buckets: self.buckets(),
            index: self.first_used,
            remaining: self.len(),
        }
    }

    /// Returns an iterator yielding mutable references to the live entries.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            buckets: self.buckets(),
            index: self.first_used,
            remaining: self.len(),
            _marker: PhantomData,
        }
    }

    /// Returns an iterator that removes and yields every live entry.
    ///
    /// Entries not consumed by the time the iterator is dropped are released
    /// anyway; the table is empty afterwards.
    pub fn drain(&mut self) -> Drain<'_, T, A> {
        let index = self.first_used;
        Drain { table: self, index }
    }

    /// Removes and returns the next live entry at or after `index`, for the
    /// draining iterators. The vacated bucket becomes empty rather than a
    /// tombstone; callers hold an exclusive borrow and finish by emptying
    /// the table, so broken probe chains are never observable.
    fn take_next(&mut self, index: &mut usize) -> Option<T> {
        while *index < self.dim {
            let i = *index;
            *index += 1;
            // SAFETY: `i` is in bounds; filled buckets own live entries.
            unsafe {
                let bucket = &mut *self.buckets.as_ptr().add(i);
                if bucket.filled() {
                    bucket.hash = HASH_EMPTY;
                    let ptr = mem::replace(&mut bucket.ptr, core::ptr::null_mut());
                    self.used -= 1;
                    return Some(self.alloc.destroy(NonNull::new_unchecked(ptr)));
                }
            }
        }
        None
    }
}

impl<T, A: Allocator> Drop for HashTable<T, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the bucket array came from `alloc_buckets` with this
        // layout.
        unsafe {
            self.alloc
                .deallocate(self.buckets.cast(), bucket_array_layout::<T>(self.dim));
        }
    }
}

impl<T, A: Allocator> Debug for HashTable<T, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len())
            .field("buckets", &self.dim)
            .field("tombstones", &self.deleted)
            .field("first_used", &self.first_used)
            .finish()
    }
}

impl<T, A> Clone for HashTable<T, A>
where
    T: Clone,
    A: Allocator + Clone,
{
    fn clone(&self) -> Self {
        let alloc = self.alloc.clone();
        let buckets = alloc_buckets::<T, A>(&alloc, self.dim);
        let mut new = Self {
            buckets,
            dim: self.dim,
            used: 0,
            deleted: 0,
            first_used: self.first_used.min(self.dim),
            alloc,
        };

        // Tombstones are not carried over; filled buckets keep their index,
        // so the first_used hint stays a valid lower bound.
        // SAFETY: the new array is fully initialized to EMPTY.
        let dst = unsafe { core::slice::from_raw_parts_mut(new.buckets.as_ptr(), new.dim) };
        for (i, bucket) in self.buckets().iter().enumerate() {
            if bucket.filled() {
                // SAFETY: a filled bucket owns a live entry.
                let value = unsafe { (*bucket.ptr).clone() };
                let ptr = new.alloc.construct(value);
                dst[i] = Bucket {
                    hash: bucket.hash,
                    ptr: ptr.as_ptr(),
                };
                new.used += 1;
            }
        }

        debug_assert_eq!(new.used, self.len());
        new
    }
}

/// Immutable iterator over a table's live entries in bucket-index order.
///
/// Created by [`HashTable::iter`]. A fresh iterator must be constructed for
/// every scan.
pub struct Iter<'a, T> {
    buckets: &'a [Bucket<T>],
    index: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        while self.index < self.buckets.len() {
            let bucket = &self.buckets[self.index];
            self.index += 1;
            if bucket.filled() {
                self.remaining -= 1;
                // SAFETY: a filled bucket owns a live entry; the borrow is
                // tied to the table.
                return Some(unsafe { &*bucket.ptr });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator over a table's live entries in bucket-index order.
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, T> {
    buckets: &'a [Bucket<T>],
    index: usize,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        while self.index < self.buckets.len() {
            let bucket = &self.buckets[self.index];
            self.index += 1;
            if bucket.filled() {
                self.remaining -= 1;
                // SAFETY: each filled bucket is visited exactly once, so no
                // two yielded references alias; the mutable table borrow
                // excludes all other access.
                return Some(unsafe { &mut *bucket.ptr });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Draining iterator created by [`HashTable::drain`].
///
/// Yields every live entry by value and leaves the table empty, releasing
/// unconsumed entries when dropped.
pub struct Drain<'a, T, A: Allocator> {
    table: &'a mut HashTable<T, A>,
    index: usize,
}

impl<T, A: Allocator> Iterator for Drain<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut index = self.index;
        let next = self.table.take_next(&mut index);
        self.index = index;
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len(), Some(self.table.len()))
    }
}

impl<T, A: Allocator> ExactSizeIterator for Drain<'_, T, A> {}
impl<T, A: Allocator> FusedIterator for Drain<'_, T, A> {}

impl<T, A: Allocator> Drop for Drain<'_, T, A> {
    fn drop(&mut self) {
        // Release whatever was not consumed and reset the counters.
        self.table.clear();
    }
}

/// Owning iterator created by consuming a table via [`IntoIterator`].
pub struct IntoIter<T, A: Allocator> {
    table: HashTable<T, A>,
    index: usize,
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut index = self.index;
        let next = self.table.take_next(&mut index);
        self.index = index;
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len(), Some(self.table.len()))
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> IntoIterator for HashTable<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        let index = self.first_used;
        IntoIter { table: self, index }
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a HashTable<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut HashTable<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

/// A view into a single slot of the table, either vacant or occupied.
///
/// Constructed by [`HashTable::entry`].
pub enum Entry<'a, T, A: Allocator = Global> {
    /// No matching entry - the slot where one would be inserted.
    Vacant(VacantEntry<'a, T, A>),
    /// A matching live entry.
    Occupied(OccupiedEntry<'a, T, A>),
}

impl<'a, T, A: Allocator> Entry<'a, T, A> {
    /// Inserts `default` if the slot is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the value produced by `default` if the slot is vacant and
    /// returns a mutable reference to the value.
    ///
    /// `default` is invoked at most once, and never when the entry already
    /// exists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use quad_hash::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// let hash = hash_u64(9);
    ///
    /// table.entry(hash, |&v| v == 9).or_insert_with(|| 9);
    ///
    /// // The closure is not called on a hit.
    /// table
    ///     .entry(hash, |&v| v == 9)
    ///     .or_insert_with(|| unreachable!());
    /// ```
    pub fn or_insert_with(self, default: impl FnOnce() -> T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the existing value, if any, and returns a mutable
    /// reference to it. Vacant slots are left vacant.
    pub fn and_modify(self, f: impl FnOnce(&mut T)) -> Option<&'a mut T> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `T::default()` if the slot is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut T
    where
        T: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant slot, created by [`HashTable::entry`].
pub struct VacantEntry<'a, T, A: Allocator = Global> {
    table: &'a mut HashTable<T, A>,
    hash: u64,
    index: usize,
}

impl<'a, T, A: Allocator> VacantEntry<'a, T, A> {
    /// Inserts `value` into the slot and returns a mutable reference to it.
    ///
    /// Reclaims a tombstone when the probe landed on one; otherwise the
    /// bucket was truly empty, and filling it may push the load factor over
    /// the grow threshold, in which case the table is resized and the slot
    /// recomputed before the value is stored.
    pub fn insert(self, value: T) -> &'a mut T {
        let table = self.table;
        let mut index = self.index;

        if table.buckets()[index].hash == HASH_DELETED {
            table.deleted -= 1;
        } else {
            debug_assert_eq!(table.buckets()[index].hash, HASH_EMPTY);
            table.used += 1;
            if table.used * GROW_DEN > table.dim * GROW_NUM {
                table.grow();
                // The slot has moved: reprobe against the fresh array.
                index = find_slot_insert(table.buckets(), table.dim - 1, self.hash);
            }
        }

        let ptr = table.alloc.construct(value);
        // SAFETY: `index` is in bounds and non-filled.
        unsafe {
            let bucket = &mut *table.buckets.as_ptr().add(index);
            bucket.hash = self.hash;
            bucket.ptr = ptr.as_ptr();
        }
        if index < table.first_used {
            table.first_used = index;
        }

        // SAFETY: entry storage is stable and exclusively owned; the borrow
        // is tied to the table's lifetime.
        unsafe { &mut *ptr.as_ptr() }
    }
}

/// A view into a filled slot, created by [`HashTable::entry`].
pub struct OccupiedEntry<'a, T, A: Allocator = Global> {
    table: &'a mut HashTable<T, A>,
    index: usize,
}

impl<'a, T, A: Allocator> OccupiedEntry<'a, T, A> {
    /// Returns a reference to the value.
    pub fn get(&self) -> &T {
        // SAFETY: the entry points at a filled bucket.
        unsafe { &*self.table.buckets()[self.index].ptr }
    }

    /// Returns a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: the entry points at a filled bucket; access is exclusive
        // through the mutable table borrow.
        unsafe { &mut *self.table.buckets()[self.index].ptr }
    }

    /// Converts the entry into a mutable reference with the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut T {
        // SAFETY: as for `get_mut`; consuming the entry keeps the borrow.
        unsafe { &mut *self.table.buckets()[self.index].ptr }
    }

    /// Removes the entry, leaving a tombstone, and returns the value.
    pub fn remove(self) -> T {
        self.table.remove_at(self.index)
    }
}
