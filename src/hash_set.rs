use core::fmt::Debug;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::hash_common::DEFAULT_LOAD_FACTOR;
use crate::hash_common::fold_key;
use crate::hash_table::Cursor as TableCursor;
use crate::hash_table::Drain as TableDrain;
use crate::hash_table::IntoIter as TableIntoIter;
use crate::hash_table::Iter as TableIter;
use crate::hash_table::LongTable;

/// A hash set of `u64` keys.
///
/// `LongSet` is a [`LongTable`] with no values: it keeps nothing but the flat
/// key array, probes linearly, and compacts clusters on removal instead of
/// leaving tombstones.
///
/// # Examples
///
/// ```rust
/// use long_hash::LongSet;
///
/// let mut set = LongSet::new();
/// assert!(set.insert(1));
/// assert!(set.insert(0));
/// assert!(!set.insert(1));
/// assert!(set.contains(0));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct LongSet {
    table: LongTable<()>,
}

impl Debug for LongSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl LongSet {
    /// Creates an empty set with the default expected size and load factor.
    pub fn new() -> Self {
        Self {
            table: LongTable::new(),
        }
    }

    /// Creates an empty set that holds `expected` keys without growing.
    ///
    /// # Panics
    ///
    /// Panics if no table can be sized for `expected` keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongSet;
    /// #
    /// let set = LongSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            table: LongTable::with_capacity(expected),
        }
    }

    /// Creates an empty set that holds `expected` keys without growing under
    /// `load_factor`.
    ///
    /// Fails with [`Error::InvalidLoadFactor`] unless `0 < load_factor < 1`.
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self, Error> {
        Ok(Self {
            table: LongTable::with_capacity_and_load_factor(expected, load_factor)?,
        })
    }

    /// Builds a set from a slice of keys. Repeated keys are stored once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongSet;
    /// #
    /// let set = LongSet::from_slice(&[3, 1, 3]);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn from_slice(keys: &[u64]) -> Self {
        let mut set = Self::with_capacity(keys.len());
        set.extend(keys);
        set
    }

    /// Like [`from_slice`](Self::from_slice), with an explicit load factor.
    pub fn from_slice_with_load_factor(keys: &[u64], load_factor: f32) -> Result<Self, Error> {
        let mut set = Self::with_capacity_and_load_factor(keys.len(), load_factor)?;
        set.extend(keys);
        Ok(set)
    }

    /// Builds a set from `keys`, failing with [`Error::DuplicateKey`] if a key
    /// appears twice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongSet;
    /// # use long_hash::Error;
    /// #
    /// let set = LongSet::of(&[0, 1, 2]).unwrap();
    /// assert_eq!(set.len(), 3);
    ///
    /// assert_eq!(LongSet::of(&[5, 5]).unwrap_err(), Error::DuplicateKey(5));
    /// ```
    pub fn of(keys: &[u64]) -> Result<Self, Error> {
        let mut set = Self::with_capacity(keys.len());
        for &key in keys {
            if !set.insert(key) {
                return Err(Error::DuplicateKey(key));
            }
        }
        Ok(set)
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of keys the set holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of slots in the backing table.
    pub fn table_size(&self) -> usize {
        self.table.table_size()
    }

    /// Returns the load factor fixed at construction.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Adds `key` to the set. Returns `true` if it was not already present.
    pub fn insert(&mut self, key: u64) -> bool {
        self.table.insert(key, ()).is_none()
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: u64) -> bool {
        self.table.contains_key(key)
    }

    /// Removes `key` from the set. Returns `true` if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongSet;
    /// #
    /// let mut set = LongSet::from([1, 2]);
    /// assert!(set.remove(1));
    /// assert!(!set.remove(1));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn remove(&mut self, key: u64) -> bool {
        self.table.remove(key).is_some()
    }

    /// Removes every key, keeping the allocated table.
    pub fn clear(&mut self) {
        self.table.clear()
    }

    /// Shrinks the table to fit the current keys. Returns `false` if the
    /// smaller table could not be allocated.
    pub fn trim(&mut self) -> bool {
        self.table.trim()
    }

    /// Shrinks the table to fit `expected` keys, never dropping below what
    /// the current keys need.
    pub fn trim_to(&mut self, expected: usize) -> bool {
        self.table.trim_to(expected)
    }

    /// Reserves room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional)
    }

    /// Keeps only the keys for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(u64) -> bool) {
        self.table.retain(|key, _| f(key))
    }

    /// Returns an iterator over the keys in unspecified order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes every key and yields it.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns a cursor that can remove the key it last yielded while walking
    /// the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongSet;
    /// #
    /// let mut set: LongSet = (1..=10).collect();
    /// let mut cursor = set.cursor();
    /// while let Ok(key) = cursor.advance() {
    ///     if key > 5 {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    /// assert_eq!(set.len(), 5);
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor {
            inner: self.table.cursor(),
        }
    }

    /// Returns `true` if every key of `self` is in `other`.
    pub fn is_subset(&self, other: &LongSet) -> bool {
        self.len() <= other.len() && self.iter().all(|key| other.contains(key))
    }

    /// Returns `true` if every key of `other` is in `self`.
    pub fn is_superset(&self, other: &LongSet) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if `self` and `other` share no key.
    pub fn is_disjoint(&self, other: &LongSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !small.iter().any(|key| large.contains(key))
    }

    /// Sum of the folded key bits over all keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongSet;
    /// #
    /// let set = LongSet::from([1, 2, 0x1_0000_0000]);
    /// assert_eq!(set.hash_code(), 1 + 2 + 1);
    /// ```
    pub fn hash_code(&self) -> u32 {
        self.iter()
            .fold(0u32, |acc, key| acc.wrapping_add(fold_key(key)))
    }

    /// Probe-length distribution of the backing table.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table.probe_histogram()
    }

    /// Debug statistics of the backing table.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl PartialEq for LongSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl Eq for LongSet {}

impl Hash for LongSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl Extend<u64> for LongSet {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0;
        if self.load_factor() <= 0.5 {
            self.table.ensure_capacity(hint);
        } else {
            self.table.ensure_capacity(self.len().saturating_add(hint));
        }
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a> Extend<&'a u64> for LongSet {
    fn extend<I: IntoIterator<Item = &'a u64>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl FromIterator<u64> for LongSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<const N: usize> From<[u64; N]> for LongSet {
    fn from(keys: [u64; N]) -> Self {
        let mut set = Self::with_capacity(N);
        set.extend(keys);
        set
    }
}

impl IntoIterator for LongSet {
    type Item = u64;
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a LongSet {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// An iterator over the keys of a [`LongSet`].
#[derive(Clone)]
pub struct Iter<'a> {
    inner: TableIter<'a, ()>,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

/// An owning iterator over the keys of a [`LongSet`].
pub struct IntoIter {
    inner: TableIntoIter<()>,
}

impl Iterator for IntoIter {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}
impl FusedIterator for IntoIter {}

/// A draining iterator over the keys of a [`LongSet`].
pub struct Drain<'a> {
    inner: TableDrain<'a, ()>,
}

impl Iterator for Drain<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Drain<'_> {}
impl FusedIterator for Drain<'_> {}

/// A cursor over a [`LongSet`] that can remove the key it last yielded.
///
/// See [`hash_table::Cursor`](crate::hash_table::Cursor) for the visiting
/// guarantees.
pub struct Cursor<'a> {
    inner: TableCursor<'a, ()>,
}

impl Cursor<'_> {
    /// Returns `true` if [`advance`](Self::advance) would yield another key.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Moves to the next key and returns it, or fails with
    /// [`Error::NoSuchElement`] once every key has been yielded.
    pub fn advance(&mut self) -> Result<u64, Error> {
        self.inner.advance()
    }

    /// The key the cursor is on, if it has not been removed.
    pub fn key(&self) -> Option<u64> {
        self.inner.key()
    }

    /// Removes the key last yielded by [`advance`](Self::advance).
    ///
    /// Fails with [`Error::IllegalState`] if there is no such key or it was
    /// already removed.
    pub fn remove(&mut self) -> Result<(), Error> {
        self.inner.remove()
    }
}

impl Iterator for Cursor<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
