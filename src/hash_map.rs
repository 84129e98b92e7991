use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FusedIterator;

use foldhash::fast::FixedState;

use crate::error::Error;
use crate::hash_common::DEFAULT_LOAD_FACTOR;
use crate::hash_common::fold_key;
pub use crate::hash_table::Cursor;
pub use crate::hash_table::Drain;
pub use crate::hash_table::Entry;
pub use crate::hash_table::IntoIter;
pub use crate::hash_table::Iter;
pub use crate::hash_table::IterMut;
use crate::hash_table::LongTable;
pub use crate::hash_table::OccupiedEntry;
pub use crate::hash_table::VacantEntry;

/// Seed of the hasher that folds values into [`LongMap::hash_code`]. Fixed,
/// so equal maps agree on their hash code across instances and processes.
const VALUE_HASH_SEED: u64 = 0x243F_6A88_85A3_08D3;

/// A hash map from `u64` keys to values of type `V`.
///
/// `LongMap<V>` stores its keys unboxed in a flat array and resolves
/// collisions by linear probing over a [`LongTable`]. Removal compacts the
/// probe cluster instead of leaving tombstones, so lookups stay fast under
/// heavy insert/remove churn.
///
/// The map also carries an optional *default return value*: a per-instance
/// fallback handed out by [`get_or_default`], [`insert_or_default`] and
/// [`remove_or_default`] when a key is absent.
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per slot for the key plus `size_of::<V>()` per slot.
///   The table is a power of two in size and is at most `load_factor` full.
/// - **Hashing**: keys are scrambled with a bijective mixer, so no hasher
///   builder is involved.
///
/// # Examples
///
/// ```rust
/// use long_hash::LongMap;
///
/// let mut scores = LongMap::new();
/// scores.insert(7, "seven");
/// scores.insert(0, "zero");
///
/// assert_eq!(scores.get(7), Some(&"seven"));
/// assert_eq!(scores.get(0), Some(&"zero"));
/// assert_eq!(scores.len(), 2);
/// ```
///
/// [`get_or_default`]: LongMap::get_or_default
/// [`insert_or_default`]: LongMap::insert_or_default
/// [`remove_or_default`]: LongMap::remove_or_default
#[derive(Clone)]
pub struct LongMap<V> {
    table: LongTable<V>,
    default_return_value: Option<V>,
}

impl<V> Debug for LongMap<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&k, v);
        }
        map.finish()
    }
}

impl<V> Default for LongMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LongMap<V> {
    /// Creates an empty map with the default expected size and load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let map: LongMap<String> = LongMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.load_factor(), 0.75);
    /// ```
    pub fn new() -> Self {
        Self::from_table(LongTable::new())
    }

    /// Creates an empty map that holds `expected` entries without growing.
    ///
    /// # Panics
    ///
    /// Panics if no table can be sized for `expected` entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let map: LongMap<String> = LongMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self::from_table(LongTable::with_capacity(expected))
    }

    /// Creates an empty map that holds `expected` entries without growing
    /// under `load_factor`.
    ///
    /// Fails with [`Error::InvalidLoadFactor`] unless `0 < load_factor < 1`,
    /// and with [`Error::CapacityOverflow`] if no table fits `expected`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// # use long_hash::error::ErrorKind;
    /// #
    /// let map: LongMap<u32> = LongMap::with_capacity_and_load_factor(4, 0.75).unwrap();
    /// assert_eq!(map.table_size(), 8);
    ///
    /// let err = LongMap::<u32>::with_capacity_and_load_factor(4, 0.0).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    /// ```
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self, Error> {
        Ok(Self::from_table(LongTable::with_capacity_and_load_factor(
            expected,
            load_factor,
        )?))
    }

    fn from_table(table: LongTable<V>) -> Self {
        Self {
            table,
            default_return_value: None,
        }
    }

    /// Builds a map from parallel key and value arrays. A key repeated in
    /// `keys` keeps the value given last.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let map = LongMap::from_arrays(&[1, 2, 1], vec!["a", "b", "c"]).unwrap();
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(1), Some(&"c"));
    ///
    /// assert!(LongMap::from_arrays(&[1, 2], vec!["a"]).is_err());
    /// ```
    pub fn from_arrays(keys: &[u64], values: Vec<V>) -> Result<Self, Error> {
        Self::from_arrays_with_load_factor(keys, values, DEFAULT_LOAD_FACTOR)
    }

    /// Like [`from_arrays`](Self::from_arrays), with an explicit load
    /// factor.
    pub fn from_arrays_with_load_factor(
        keys: &[u64],
        values: Vec<V>,
        load_factor: f32,
    ) -> Result<Self, Error> {
        if keys.len() != values.len() {
            return Err(Error::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut map = Self::with_capacity_and_load_factor(keys.len(), load_factor)?;
        for (&key, value) in keys.iter().zip(values) {
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Builds a map from `(key, value)` pairs, failing with
    /// [`Error::DuplicateKey`] if a key appears twice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// # use long_hash::Error;
    /// #
    /// let map = LongMap::of([(1, 'a'), (0, 'z')]).unwrap();
    /// assert_eq!(map.get(0), Some(&'z'));
    ///
    /// assert_eq!(LongMap::of([(3, 'a'), (3, 'b')]).unwrap_err(), Error::DuplicateKey(3));
    /// ```
    pub fn of<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (u64, V)>,
    {
        let pairs = pairs.into_iter();
        let mut map = Self::with_capacity(pairs.size_hint().0);
        for (key, value) in pairs {
            match map.entry(key) {
                Entry::Occupied(_) => return Err(Error::DuplicateKey(key)),
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        Ok(map)
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map holds before it grows.
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

    /// Returns the default return value, if one is set.
    pub fn default_return_value(&self) -> Option<&V> {
        self.default_return_value.as_ref()
    }

    /// Sets the value handed out for absent keys by
    /// [`get_or_default`](Self::get_or_default),
    /// [`insert_or_default`](Self::insert_or_default) and
    /// [`remove_or_default`](Self::remove_or_default).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.set_default_return_value(-1);
    /// map.insert(1, 10);
    /// assert_eq!(map.get_or_default(1), Some(&10));
    /// assert_eq!(map.get_or_default(2), Some(&-1));
    /// assert_eq!(map.get(2), None);
    /// ```
    pub fn set_default_return_value(&mut self, value: V) {
        self.default_return_value = Some(value);
    }

    /// Clears the default return value and returns it.
    pub fn take_default_return_value(&mut self) -> Option<V> {
        self.default_return_value.take()
    }

    /// Inserts `value` under `key`, returning the value it replaces.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// ```
    pub fn insert(&mut self, key: u64, value: V) -> Option<V> {
        self.table.insert(key, value)
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get(&self, key: u64) -> Option<&V> {
        self.table.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.insert(1, 10);
    /// if let Some(v) = map.get_mut(1) {
    ///     *v += 5;
    /// }
    /// assert_eq!(map.get(1), Some(&15));
    /// ```
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// Returns the value stored under `key`, or the default return value if
    /// the key is absent.
    pub fn get_or_default(&self, key: u64) -> Option<&V> {
        self.table.get(key).or(self.default_return_value.as_ref())
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: u64) -> bool {
        self.table.contains_key(key)
    }

    /// Returns `true` if some key maps to `value`. Runs in linear time.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Removes `key` and returns its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(1), Some("a"));
    /// assert_eq!(map.remove(1), None);
    /// ```
    pub fn remove(&mut self, key: u64) -> Option<V> {
        self.table.remove(key)
    }

    /// Removes `key` and returns its value, or a copy of the default return
    /// value if the key was absent.
    pub fn remove_or_default(&mut self, key: u64) -> Option<V>
    where
        V: Clone,
    {
        self.table
            .remove(key)
            .or_else(|| self.default_return_value.clone())
    }

    /// Inserts `value` under `key` and returns the value it replaces, or a
    /// copy of the default return value if the key was absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.set_default_return_value(-1);
    /// assert_eq!(map.insert_or_default(4, 10), Some(-1));
    /// assert_eq!(map.insert_or_default(4, 20), Some(10));
    /// ```
    pub fn insert_or_default(&mut self, key: u64, value: V) -> Option<V>
    where
        V: Clone,
    {
        self.table
            .insert(key, value)
            .or_else(|| self.default_return_value.clone())
    }

    /// Removes `key` and returns it with its value.
    pub fn remove_entry(&mut self, key: u64) -> Option<(u64, V)> {
        self.table.remove(key).map(|value| (key, value))
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut counts: LongMap<u32> = LongMap::new();
    /// for key in [3, 1, 3, 3] {
    ///     *counts.entry(key).or_default() += 1;
    /// }
    /// assert_eq!(counts.get(3), Some(&3));
    /// assert_eq!(counts.get(1), Some(&1));
    /// ```
    pub fn entry(&mut self, key: u64) -> Entry<'_, V> {
        self.table.entry(key)
    }

    /// Removes every entry, keeping the allocated table.
    pub fn clear(&mut self) {
        self.table.clear()
    }

    /// Shrinks the table to fit the current entries. Returns `false` if the
    /// smaller table could not be allocated.
    pub fn trim(&mut self) -> bool {
        self.table.trim()
    }

    /// Shrinks the table to fit `expected` entries, never dropping below what
    /// the current entries need. Returns `false` if the smaller table could
    /// not be allocated.
    pub fn trim_to(&mut self, expected: usize) -> bool {
        self.table.trim_to(expected)
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional)
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map: LongMap<u64> = (0..10).map(|k| (k, k * 10)).collect();
    /// map.retain(|k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 5);
    /// ```
    pub fn retain(&mut self, f: impl FnMut(u64, &mut V) -> bool) {
        self.table.retain(f)
    }

    /// Returns an iterator over `(key, &value)` pairs in unspecified order.
    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }

    /// Returns an iterator over `(key, &mut value)` pairs in unspecified
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        self.table.iter_mut()
    }

    /// Returns an iterator over the keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let map = LongMap::of([(1, "a"), (2, "b")]).unwrap();
    /// let mut keys: Vec<u64> = map.keys().collect();
    /// keys.sort();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Removes every entry and yields it by value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map = LongMap::of([(1, "a"), (2, "b")]).unwrap();
    /// let mut drained: Vec<_> = map.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [(1, "a"), (2, "b")]);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        self.table.drain()
    }

    /// Returns a cursor that can remove the entry it last yielded while
    /// walking the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let mut map: LongMap<u64> = (1..=100).map(|k| (k, k)).collect();
    /// let mut cursor = map.cursor();
    /// while cursor.has_next() {
    ///     cursor.advance().unwrap();
    ///     if cursor.value().is_some_and(|v| v % 2 == 0) {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    /// assert_eq!(map.len(), 50);
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, V> {
        self.table.cursor()
    }

    /// Sum over every entry of the folded key bits xor the value's hash.
    ///
    /// Equal maps produce equal hash codes regardless of insertion order or
    /// table size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::LongMap;
    /// #
    /// let a = LongMap::of([(1, "x"), (2, "y")]).unwrap();
    /// let b = LongMap::of([(2, "y"), (1, "x")]).unwrap();
    /// assert_eq!(a.hash_code(), b.hash_code());
    /// ```
    pub fn hash_code(&self) -> u64
    where
        V: Hash,
    {
        let values = FixedState::with_seed(VALUE_HASH_SEED);
        self.iter().fold(0u64, |acc, (key, value)| {
            acc.wrapping_add(u64::from(fold_key(key)) ^ values.hash_one(value))
        })
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

impl<V> PartialEq for LongMap<V>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<V> Eq for LongMap<V> where V: Eq {}

impl<V> Hash for LongMap<V>
where
    V: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<V> Extend<(u64, V)> for LongMap<V> {
    fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0;
        // Sparse tables absorb duplicates in the hint; dense ones would rehash
        // twice if the incoming keys are mostly new.
        if self.load_factor() <= 0.5 {
            self.table.ensure_capacity(hint);
        } else {
            self.table.ensure_capacity(self.len().saturating_add(hint));
        }
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, V> Extend<(u64, &'a V)> for LongMap<V>
where
    V: Copy + 'a,
{
    fn extend<I: IntoIterator<Item = (u64, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(key, &value)| (key, value)));
    }
}

impl<V> FromIterator<(u64, V)> for LongMap<V> {
    fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V, const N: usize> From<[(u64, V); N]> for LongMap<V> {
    fn from(pairs: [(u64, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<V> IntoIterator for LongMap<V> {
    type Item = (u64, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        self.table.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a LongMap<V> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut LongMap<V> {
    type Item = (u64, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// An iterator over the keys of a [`LongMap`].
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> Clone for Keys<'_, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<V> Iterator for Keys<'_, V> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}
impl<V> FusedIterator for Keys<'_, V> {}

/// An iterator over the values of a [`LongMap`].
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> Clone for Values<'_, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}

/// A mutable iterator over the values of a [`LongMap`].
pub struct ValuesMut<'a, V> {
    inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}
impl<V> FusedIterator for ValuesMut<'_, V> {}
