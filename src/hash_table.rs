//! The open-addressing engine shared by [`LongMap`](crate::LongMap) and
//! [`LongSet`](crate::LongSet).

use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::iter::Rev;
use core::iter::Zip;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::slice;

use crate::error::Error;
use crate::hash_common::DEFAULT_INITIAL_SIZE;
use crate::hash_common::DEFAULT_LOAD_FACTOR;
use crate::hash_common::array_size;
use crate::hash_common::max_fill;
use crate::hash_common::mix;

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

/// Table size for `expected` elements under an already validated load factor.
#[inline]
fn grow_size(expected: usize, load_factor: f32) -> usize {
    match array_size(expected, load_factor) {
        Ok(n) => n,
        Err(_) => capacity_overflow(),
    }
}

type Slots<V> = (Box<[u64]>, Box<[MaybeUninit<V>]>);

/// Allocates the key and value arrays for a table of `n` slots plus the
/// trailing slot reserved for the zero key.
fn allocate<V>(n: usize) -> Slots<V> {
    let keys = alloc::vec![0u64; n + 1].into_boxed_slice();
    let mut values = Vec::with_capacity(n + 1);
    values.resize_with(n + 1, MaybeUninit::uninit);
    (keys, values.into_boxed_slice())
}

fn try_allocate<V>(n: usize) -> Result<Slots<V>, TryReserveError> {
    let mut keys = Vec::new();
    keys.try_reserve_exact(n + 1)?;
    keys.resize(n + 1, 0u64);

    let mut values = Vec::new();
    values.try_reserve_exact(n + 1)?;
    values.resize_with(n + 1, MaybeUninit::uninit);

    Ok((keys.into_boxed_slice(), values.into_boxed_slice()))
}

/// Probe-length distribution of a table.
///
/// `buckets[d]` counts the live non-zero keys stored `d` slots past their
/// home slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Number of keys per probe distance.
    pub buckets: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Longest probe distance present in the table.
    pub fn max_probe_length(&self) -> usize {
        self.buckets.len().saturating_sub(1)
    }

    /// Average probe distance over all counted keys.
    pub fn mean_probe_length(&self) -> f64 {
        let total: usize = self.buckets.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: usize = self
            .buckets
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        weighted as f64 / total as f64
    }

    /// Pretty-print the histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let total: usize = self.buckets.iter().sum();
        println!("=== Probe Length Histogram ===");
        for (distance, count) in self.buckets.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let share = *count as f64 / total.max(1) as f64;
            let bar = "#".repeat((share * 50.0).ceil() as usize);
            println!(
                "{:>4}: {:>8} ({:>6.2}%) {}",
                distance,
                count,
                share * 100.0,
                bar
            );
        }
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table, zero key included.
    pub populated: usize,
    /// Number of entries the table holds before it grows.
    pub capacity: usize,
    /// Number of body slots (a power of two).
    pub table_size: usize,
    /// The table never shrinks below this many slots.
    pub min_table_size: usize,
    /// Whether the reserved zero-key slot is in use.
    pub has_zero_key: bool,
    /// Configured load factor.
    pub target_load_factor: f32,
    /// Actual load (populated / table_size).
    pub load_factor: f64,
    /// Longest distance between a key and its home slot.
    pub max_probe_length: usize,
    /// Mean distance between a key and its home slot.
    pub mean_probe_length: f64,
    /// Total memory in bytes used by the key and value arrays.
    pub total_bytes: usize,
    /// Bytes spent on slots that hold no entry.
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load, target {:.2}%)",
            self.populated,
            self.table_size,
            self.load_factor * 100.0,
            self.target_load_factor * 100.0
        );
        println!(
            "Capacity: {} (minimum table size {})",
            self.capacity, self.min_table_size
        );
        println!("Zero key present: {}", self.has_zero_key);
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// An open-addressing hash table keyed by `u64`, using linear probing and
/// tombstone-free backward-shift deletion.
///
/// `LongTable<V>` is the engine behind [`LongMap`] and [`LongSet`]. Keys are
/// scrambled with [`mix`] and masked down to a home slot; collisions walk
/// forward one slot at a time, wrapping at the end of the table.
///
/// Key `0` marks an empty slot, so the real key `0` lives in a reserved slot
/// past the end of the table and is tracked by a flag.
///
/// ## Performance Characteristics
///
/// - **Memory**: 8 bytes per slot for the key plus `size_of::<V>()` per slot,
///   with `n + 1` slots for a table of size `n`.
/// - **Removal**: never leaves tombstones, so lookups never slow down after
///   heavy churn.
///
/// ## Example
///
/// ```rust
/// use long_hash::hash_table::LongTable;
///
/// let mut table = LongTable::new();
/// assert_eq!(table.insert(7, "seven"), None);
/// assert_eq!(table.insert(0, "zero"), None);
/// assert_eq!(table.get(7), Some(&"seven"));
/// assert_eq!(table.remove(0), Some("zero"));
/// assert_eq!(table.len(), 1);
/// ```
///
/// [`LongMap`]: crate::LongMap
/// [`LongSet`]: crate::LongSet
pub struct LongTable<V> {
    // Slot `i < n` is live iff `keys[i] != 0`, and then `values[i]` is
    // initialized. `values[n]` is initialized iff `contains_zero`.
    keys: Box<[u64]>,
    values: Box<[MaybeUninit<V>]>,
    contains_zero: bool,

    n: usize,
    mask: usize,
    max_fill: usize,
    min_n: usize,
    size: usize,
    load_factor: f32,
}

impl<V> Debug for LongTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        let slots = self.keys[..self.n]
            .iter()
            .map(|&key| {
                if key == 0 {
                    String::from("....")
                } else {
                    format!("{:016x}@{:x}", key, mix(key) as usize & self.mask)
                }
            })
            .collect::<Vec<_>>();

        f.debug_struct("LongTable")
            .field("slots", &slots)
            .field("contains_zero", &self.contains_zero)
            .field("size", &self.size)
            .field("capacity", &self.max_fill)
            .field("table_size", &self.n)
            .field("min_table_size", &self.min_n)
            .finish()
    }
}

impl<V> Clone for LongTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut table = Self::with_table_size(self.n, self.load_factor);
        table.min_n = self.min_n;

        // Same size and mask, so every entry keeps its slot. The value is
        // written before its key so a panicking `clone` never leaves a live
        // key over an uninitialized value.
        for (index, &key) in self.keys[..self.n].iter().enumerate() {
            if key != 0 {
                // SAFETY: A non-zero key marks an initialized value.
                let value = unsafe { self.values[index].assume_init_ref() }.clone();
                table.values[index] = MaybeUninit::new(value);
                table.keys[index] = key;
                table.size += 1;
            }
        }

        if self.contains_zero {
            // SAFETY: `contains_zero` marks the reserved slot as initialized.
            let value = unsafe { self.values[self.n].assume_init_ref() }.clone();
            table.values[self.n] = MaybeUninit::new(value);
            table.contains_zero = true;
            table.size += 1;
        }

        debug_assert_eq!(table.size, self.size);
        table
    }
}

impl<V> Drop for LongTable<V> {
    fn drop(&mut self) {
        self.drop_values();
    }
}

impl<V> Default for LongTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LongTable<V> {
    /// Creates an empty table sized for the default expected element count
    /// and load factor.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE)
    }

    /// Creates an empty table that holds `expected` elements without
    /// growing, using the default load factor.
    ///
    /// # Panics
    ///
    /// Panics if no table can be sized for `expected` elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let table: LongTable<String> = LongTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_table_size(grow_size(expected, DEFAULT_LOAD_FACTOR), DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty table that holds `expected` elements without
    /// growing under the given load factor.
    ///
    /// Fails with [`Error::InvalidLoadFactor`] unless `0 < load_factor < 1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let table: LongTable<u8> = LongTable::with_capacity_and_load_factor(4, 0.75).unwrap();
    /// assert_eq!(table.table_size(), 8);
    /// assert_eq!(table.capacity(), 6);
    ///
    /// assert!(LongTable::<u8>::with_capacity_and_load_factor(4, 1.0).is_err());
    /// ```
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self, Error> {
        let n = array_size(expected, load_factor)?;
        Ok(Self::with_table_size(n, load_factor))
    }

    fn with_table_size(n: usize, load_factor: f32) -> Self {
        debug_assert!(n.is_power_of_two());
        let (keys, values) = allocate(n);
        Self {
            keys,
            values,
            contains_zero: false,
            n,
            mask: n - 1,
            max_fill: max_fill(n, load_factor),
            min_n: n,
            size: 0,
            load_factor,
        }
    }

    /// Returns the number of entries in the table, the zero key included.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of entries the table holds before it grows.
    pub fn capacity(&self) -> usize {
        self.max_fill
    }

    /// Returns the current number of slots (always a power of two).
    pub fn table_size(&self) -> usize {
        self.n
    }

    /// Returns the slot count the table was created with. Removals and
    /// trimming never shrink the table below it.
    pub fn min_table_size(&self) -> usize {
        self.min_n
    }

    /// Returns the load factor fixed at construction.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    #[inline(always)]
    fn home(&self, key: u64) -> usize {
        mix(key) as usize & self.mask
    }

    /// Walks the probe sequence of `key`.
    ///
    /// Returns `Ok(slot)` when the key is present and `Err(slot)` with the
    /// empty slot it would be written to otherwise. Key `0` maps to the
    /// reserved slot `n` either way.
    #[inline]
    fn probe(&self, key: u64) -> Result<usize, usize> {
        if key == 0 {
            return if self.contains_zero {
                Ok(self.n)
            } else {
                Err(self.n)
            };
        }

        let mut pos = self.home(key);
        loop {
            // SAFETY: `pos` is masked by `n - 1` and `keys` has `n + 1` slots.
            let curr = unsafe { *self.keys.get_unchecked(pos) };
            if curr == 0 {
                return Err(pos);
            }
            if curr == key {
                return Ok(pos);
            }
            pos = (pos + 1) & self.mask;
        }
    }

    #[inline]
    fn find(&self, key: u64) -> Option<usize> {
        self.probe(key).ok()
    }

    /// Slot of a key known to be present.
    fn locate(&self, key: u64) -> usize {
        if key == 0 {
            debug_assert!(self.contains_zero);
            return self.n;
        }

        let mut pos = self.home(key);
        while self.keys[pos] != key {
            debug_assert_ne!(self.keys[pos], 0, "key {key} is not in the table");
            pos = (pos + 1) & self.mask;
        }
        pos
    }

    /// Writes a new entry into the empty slot `pos` found by [`Self::probe`],
    /// growing the table if it is now over capacity. Returns the slot the
    /// entry ends up in.
    fn insert_vacant(&mut self, pos: usize, key: u64, value: V) -> usize {
        self.values[pos] = MaybeUninit::new(value);
        if key == 0 {
            debug_assert_eq!(pos, self.n);
            self.contains_zero = true;
        } else {
            self.keys[pos] = key;
        }

        self.size += 1;
        if self.size > self.max_fill {
            self.rehash(grow_size(self.size + 1, self.load_factor));
            return self.locate(key);
        }
        pos
    }

    fn rehash(&mut self, new_n: usize) {
        let (keys, values) = allocate(new_n);
        self.rehash_into(new_n, keys, values);
    }

    fn try_rehash(&mut self, new_n: usize) -> Result<(), TryReserveError> {
        let (keys, values) = try_allocate(new_n)?;
        self.rehash_into(new_n, keys, values);
        Ok(())
    }

    /// Moves every live entry into the fresh arrays `keys`/`values` of
    /// `new_n` slots and swaps them in.
    fn rehash_into(
        &mut self,
        new_n: usize,
        mut keys: Box<[u64]>,
        mut values: Box<[MaybeUninit<V>]>,
    ) {
        debug_assert!(new_n.is_power_of_two());

        let new_mask = new_n - 1;
        let mut remaining = self.size - usize::from(self.contains_zero);
        let mut index = 0;
        while remaining > 0 {
            let key = self.keys[index];
            if key != 0 {
                let mut pos = mix(key) as usize & new_mask;
                while keys[pos] != 0 {
                    pos = (pos + 1) & new_mask;
                }
                keys[pos] = key;
                values[pos] = core::mem::replace(&mut self.values[index], MaybeUninit::uninit());
                remaining -= 1;
            }
            index += 1;
        }

        if self.contains_zero {
            values[new_n] = core::mem::replace(&mut self.values[self.n], MaybeUninit::uninit());
        }

        // The old arrays only hold moved-out slots now; releasing them drops
        // no values.
        self.keys = keys;
        self.values = values;
        self.n = new_n;
        self.mask = new_mask;
        self.max_fill = max_fill(new_n, self.load_factor);
    }

    /// Closes the gap at slot `pos` by shifting the rest of its cluster
    /// backward.
    ///
    /// The value at `pos` must already have been moved out. Every entry whose
    /// home slot lies outside the cyclic range `(last, pos]` is moved into the
    /// gap, which then moves to the entry's old slot; the scan ends at the
    /// first empty slot. Entries moved from a slot that wrapped around past
    /// the end of the table are pushed to `wrapped`, if given.
    fn shift_keys(&mut self, mut pos: usize, mut wrapped: Option<&mut Vec<u64>>) {
        loop {
            let last = pos;
            pos = (pos + 1) & self.mask;

            let curr = loop {
                let curr = self.keys[pos];
                if curr == 0 {
                    self.keys[last] = 0;
                    return;
                }

                let slot = self.home(curr);
                let stays = if last <= pos {
                    last < slot && slot <= pos
                } else {
                    last < slot || slot <= pos
                };
                if !stays {
                    break curr;
                }
                pos = (pos + 1) & self.mask;
            };

            if pos < last {
                if let Some(wrapped) = wrapped.as_deref_mut() {
                    wrapped.push(curr);
                }
            }
            self.keys[last] = curr;
            self.values.swap(last, pos);
        }
    }

    /// Moves the value out of slot `pos` and compacts its cluster.
    ///
    /// # Safety
    ///
    /// `pos` must be a live slot: either a body slot holding a non-zero key
    /// or the reserved slot `n` while the zero key is present.
    unsafe fn take_at(&mut self, pos: usize, wrapped: Option<&mut Vec<u64>>) -> V {
        let slot = core::mem::replace(&mut self.values[pos], MaybeUninit::uninit());
        // SAFETY: The caller guarantees `pos` is live, so its value is
        // initialized. The slot is marked dead below before anything reads it.
        let value = unsafe { slot.assume_init() };

        if pos == self.n {
            self.contains_zero = false;
        } else {
            self.shift_keys(pos, wrapped);
        }
        self.size -= 1;
        value
    }

    fn maybe_shrink(&mut self) {
        if self.n > self.min_n && self.size < self.max_fill / 4 && self.n > DEFAULT_INITIAL_SIZE {
            self.rehash(self.n / 2);
        }
    }

    /// Grows the table so it holds `expected` entries without rehashing.
    pub(crate) fn ensure_capacity(&mut self, expected: usize) {
        let needed = grow_size(expected, self.load_factor);
        if needed > self.n {
            self.rehash(needed);
        }
    }

    /// Drops every live value, marking each slot dead before dropping it so
    /// a panicking destructor cannot cause a double drop.
    fn drop_values(&mut self) {
        if !core::mem::needs_drop::<V>() || self.size == 0 {
            return;
        }

        if self.contains_zero {
            self.contains_zero = false;
            // SAFETY: The zero-key slot was initialized and is now marked dead.
            unsafe { self.values[self.n].assume_init_drop() };
        }

        for index in 0..self.n {
            if self.keys[index] != 0 {
                self.keys[index] = 0;
                // SAFETY: The key was live, so the value is initialized. It is
                // now marked dead.
                unsafe { self.values[index].assume_init_drop() };
            }
        }
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let mut table = LongTable::new();
    /// table.insert(1, "a");
    /// assert_eq!(table.get(1), Some(&"a"));
    /// assert_eq!(table.get(2), None);
    /// ```
    pub fn get(&self, key: u64) -> Option<&V> {
        let pos = self.find(key)?;
        // SAFETY: `find` only returns live slots.
        Some(unsafe { self.values[pos].assume_init_ref() })
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let pos = self.find(key)?;
        // SAFETY: `find` only returns live slots.
        Some(unsafe { self.values[pos].assume_init_mut() })
    }

    /// Returns `true` if the table contains `key`.
    pub fn contains_key(&self, key: u64) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `value` under `key`, returning the value it replaces.
    ///
    /// Grows the table when the new entry pushes it over capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let mut table = LongTable::new();
    /// assert_eq!(table.insert(37, "a"), None);
    /// assert_eq!(table.insert(37, "b"), Some("a"));
    /// assert_eq!(table.get(37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: u64, value: V) -> Option<V> {
        match self.probe(key) {
            Ok(pos) => {
                // SAFETY: `probe` returned a live slot.
                let slot = unsafe { self.values[pos].assume_init_mut() };
                Some(core::mem::replace(slot, value))
            }
            Err(pos) => {
                self.insert_vacant(pos, key, value);
                None
            }
        }
    }

    /// Removes `key` and returns its value.
    ///
    /// The cluster after the removed slot is compacted in place, and the
    /// table shrinks by half once it falls under a quarter of its capacity
    /// (never below its construction size).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let mut table = LongTable::new();
    /// table.insert(42, 'x');
    /// assert_eq!(table.remove(42), Some('x'));
    /// assert_eq!(table.remove(42), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let pos = self.find(key)?;
        // SAFETY: `find` only returns live slots.
        let value = unsafe { self.take_at(pos, None) };
        self.maybe_shrink();
        Some(value)
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let mut table = LongTable::new();
    /// *table.entry(3).or_insert(0) += 10;
    /// *table.entry(3).or_insert(0) += 10;
    /// assert_eq!(table.get(3), Some(&20));
    /// ```
    pub fn entry(&mut self, key: u64) -> Entry<'_, V> {
        match self.probe(key) {
            Ok(pos) => Entry::Occupied(OccupiedEntry {
                table: self,
                key,
                pos,
            }),
            Err(pos) => Entry::Vacant(VacantEntry {
                table: self,
                key,
                pos,
            }),
        }
    }

    /// Removes every entry, keeping the current table size.
    ///
    /// Use [`trim`](Self::trim) afterwards to release memory.
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        self.drop_values();
        self.keys.fill(0);
        self.contains_zero = false;
        self.size = 0;
    }

    /// Shrinks the table to the smallest size that holds the current
    /// entries, never below the construction size.
    ///
    /// Returns `false` if the smaller table could not be allocated; the
    /// table is then left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let mut table = LongTable::with_capacity(4);
    /// for key in 1..=1000 {
    ///     table.insert(key, key);
    /// }
    /// table.retain(|key, _| key <= 10);
    /// assert!(table.trim());
    /// assert_eq!(table.table_size(), 16);
    /// assert_eq!(table.get(10), Some(&10));
    /// ```
    pub fn trim(&mut self) -> bool {
        self.trim_to(self.size)
    }

    /// Shrinks the table to the smallest size that holds `expected` entries,
    /// never below the construction size nor below what the current entries
    /// need.
    ///
    /// Returns `true` without doing anything when the table is already that
    /// small, and `false` if the smaller table could not be allocated.
    pub fn trim_to(&mut self, expected: usize) -> bool {
        let target = match array_size(expected, self.load_factor) {
            Ok(n) => n.max(self.min_n),
            Err(_) => return true,
        };
        if target >= self.n || self.size > max_fill(target, self.load_factor) {
            return true;
        }
        self.try_rehash(target).is_ok()
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.ensure_capacity(self.size.saturating_add(additional));
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// Runs through a [`Cursor`], so every entry is visited exactly once
    /// even as clusters are compacted.
    pub fn retain(&mut self, mut f: impl FnMut(u64, &mut V) -> bool) {
        let mut cursor = self.cursor();
        while let Ok(key) = cursor.advance() {
            let keep = match cursor.value_mut() {
                Some(value) => f(key, value),
                None => true,
            };
            if !keep {
                let removed = cursor.remove();
                debug_assert!(removed.is_ok(), "cursor lost entry {key}");
            }
        }
    }

    /// Returns an iterator over `(key, &value)` pairs in unspecified order.
    pub fn iter(&self) -> Iter<'_, V> {
        let (body, zero) = self.values.split_at(self.n);
        Iter {
            // SAFETY: `contains_zero` marks the reserved slot as initialized.
            zero: if self.contains_zero {
                Some(unsafe { zero[0].assume_init_ref() })
            } else {
                None
            },
            body: self.keys[..self.n].iter().zip(body.iter()).rev(),
            remaining: self.size,
        }
    }

    /// Returns an iterator over `(key, &mut value)` pairs in unspecified
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let contains_zero = self.contains_zero;
        let remaining = self.size;
        let (body, zero) = self.values.split_at_mut(self.n);
        IterMut {
            // SAFETY: `contains_zero` marks the reserved slot as initialized.
            zero: if contains_zero {
                Some(unsafe { zero[0].assume_init_mut() })
            } else {
                None
            },
            body: self.keys[..self.n].iter().zip(body.iter_mut()).rev(),
            remaining,
        }
    }

    /// Removes every entry and yields it by value. The table keeps its
    /// current size.
    pub fn drain(&mut self) -> Drain<'_, V> {
        let mut fresh = Self::with_table_size(self.n, self.load_factor);
        fresh.min_n = self.min_n;
        let taken = core::mem::replace(self, fresh);
        Drain {
            inner: taken.into_iter(),
            _marker: PhantomData,
        }
    }

    /// Returns a cursor that walks the table and can remove the entry it
    /// last yielded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_hash::hash_table::LongTable;
    /// #
    /// let mut table = LongTable::new();
    /// for key in 1..=100u64 {
    ///     table.insert(key, ());
    /// }
    ///
    /// let mut cursor = table.cursor();
    /// while let Ok(key) = cursor.advance() {
    ///     if key % 2 == 0 {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    /// assert_eq!(table.len(), 50);
    /// assert!(table.contains_key(99) && !table.contains_key(98));
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, V> {
        Cursor {
            pos: self.n,
            remaining: self.size,
            must_return_zero: self.contains_zero,
            last: Last::Nothing,
            current: None,
            wrapped: Vec::new(),
            wrapped_pos: 0,
            table: self,
        }
    }

    /// Probe-length distribution of the non-zero keys.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut buckets = Vec::new();
        for (index, &key) in self.keys[..self.n].iter().enumerate() {
            if key == 0 {
                continue;
            }
            let distance = index.wrapping_sub(self.home(key)) & self.mask;
            if buckets.len() <= distance {
                buckets.resize(distance + 1, 0);
            }
            buckets[distance] += 1;
        }
        ProbeHistogram { buckets }
    }

    /// Collects debug statistics about the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let slot_bytes = core::mem::size_of::<u64>() + core::mem::size_of::<V>();
        let total_slots = self.n + 1;
        DebugStats {
            populated: self.size,
            capacity: self.max_fill,
            table_size: self.n,
            min_table_size: self.min_n,
            has_zero_key: self.contains_zero,
            target_load_factor: self.load_factor,
            load_factor: self.size as f64 / self.n as f64,
            max_probe_length: histogram.max_probe_length(),
            mean_probe_length: histogram.mean_probe_length(),
            total_bytes: total_slots * slot_bytes,
            wasted_bytes: (total_slots - self.size) * slot_bytes,
        }
    }

    /// Checks that every live key is reachable from its home slot without
    /// crossing an empty slot, and that the bookkeeping adds up.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.n.is_power_of_two());
        assert_eq!(self.mask, self.n - 1);
        assert_eq!(self.keys.len(), self.n + 1);
        assert_eq!(self.values.len(), self.n + 1);
        assert!(self.n >= self.min_n);
        assert!(self.size <= self.max_fill, "{:#?}", self);

        let mut live = usize::from(self.contains_zero);
        for (index, &key) in self.keys[..self.n].iter().enumerate() {
            if key == 0 {
                continue;
            }
            live += 1;
            let mut pos = self.home(key);
            while pos != index {
                assert_ne!(self.keys[pos], 0, "{key} unreachable: {:#?}", self);
                pos = (pos + 1) & self.mask;
            }
        }
        assert_eq!(live, self.size, "{:#?}", self);
    }

    #[cfg(test)]
    pub(crate) fn slot_of(&self, key: u64) -> Option<usize> {
        self.find(key)
    }
}

impl<V> IntoIterator for LongTable<V> {
    type Item = (u64, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        IntoIter {
            pos: self.n,
            table: self,
        }
    }
}

impl<'a, V> IntoIterator for &'a LongTable<V> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut LongTable<V> {
    type Item = (u64, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// A view into a single entry of a [`LongTable`], which may either be vacant
/// or occupied.
///
/// This enum is constructed from the [`entry`] method on [`LongTable`].
///
/// [`entry`]: LongTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from `default` if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Like [`or_insert_with`](Self::or_insert_with), passing the key to
    /// `default`.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(u64) -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key);
                entry.insert(value)
            }
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

    /// Returns this entry's key.
    pub fn key(&self) -> u64 {
        match self {
            Entry::Occupied(entry) => entry.key,
            Entry::Vacant(entry) => entry.key,
        }
    }
}

impl<'a, V> Entry<'a, V>
where
    V: Default,
{
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`LongTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut LongTable<V>,
    key: u64,
    pos: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Returns the key that would be used when inserting.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Inserts `value` and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        let pos = table.insert_vacant(self.pos, self.key, value);
        // SAFETY: `insert_vacant` returns the slot the value now lives in.
        unsafe { table.values[pos].assume_init_mut() }
    }
}

/// A view into an occupied entry in a [`LongTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut LongTable<V>,
    key: u64,
    pos: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns the entry's key.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Returns a reference to the entry's value.
    pub fn get(&self) -> &V {
        // SAFETY: An occupied entry always points at a live slot.
        unsafe { self.table.values[self.pos].assume_init_ref() }
    }

    /// Returns a mutable reference to the entry's value.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: An occupied entry always points at a live slot.
        unsafe { self.table.values[self.pos].assume_init_mut() }
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        // SAFETY: An occupied entry always points at a live slot.
        unsafe { self.table.values[self.pos].assume_init_mut() }
    }

    /// Replaces the entry's value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry and returns its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry and returns its key and value.
    pub fn remove_entry(self) -> (u64, V) {
        // SAFETY: An occupied entry always points at a live slot.
        let value = unsafe { self.table.take_at(self.pos, None) };
        self.table.maybe_shrink();
        (self.key, value)
    }
}

/// An iterator over the entries of a [`LongTable`].
///
/// This struct is created by the [`iter`] method on [`LongTable`]. The zero
/// key comes first, then the table is walked from its last slot down.
///
/// [`iter`]: LongTable::iter
pub struct Iter<'a, V> {
    zero: Option<&'a V>,
    body: Rev<Zip<slice::Iter<'a, u64>, slice::Iter<'a, MaybeUninit<V>>>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            zero: self.zero,
            body: self.body.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        if let Some(value) = self.zero.take() {
            self.remaining -= 1;
            return Some((0, value));
        }

        for (&key, value) in self.body.by_ref() {
            if key != 0 {
                self.remaining -= 1;
                // SAFETY: A non-zero key marks an initialized value.
                return Some((key, unsafe { value.assume_init_ref() }));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the entries of a [`LongTable`].
///
/// This struct is created by the [`iter_mut`] method on [`LongTable`].
///
/// [`iter_mut`]: LongTable::iter_mut
pub struct IterMut<'a, V> {
    zero: Option<&'a mut V>,
    body: Rev<Zip<slice::Iter<'a, u64>, slice::IterMut<'a, MaybeUninit<V>>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (u64, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        if let Some(value) = self.zero.take() {
            self.remaining -= 1;
            return Some((0, value));
        }

        for (&key, value) in self.body.by_ref() {
            if key != 0 {
                self.remaining -= 1;
                // SAFETY: A non-zero key marks an initialized value.
                return Some((key, unsafe { value.assume_init_mut() }));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the entries of a [`LongTable`].
pub struct IntoIter<V> {
    // Entries already yielded have their key cleared so the table's drop
    // skips them; the table is never probed again.
    table: LongTable<V>,
    pos: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (u64, V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = &mut self.table;
        if table.size == 0 {
            return None;
        }

        if table.contains_zero {
            table.contains_zero = false;
            table.size -= 1;
            let slot = core::mem::replace(&mut table.values[table.n], MaybeUninit::uninit());
            // SAFETY: The zero-key slot was initialized and is now marked dead.
            return Some((0, unsafe { slot.assume_init() }));
        }

        while self.pos > 0 {
            self.pos -= 1;
            let key = table.keys[self.pos];
            if key != 0 {
                table.keys[self.pos] = 0;
                table.size -= 1;
                let slot = core::mem::replace(&mut table.values[self.pos], MaybeUninit::uninit());
                // SAFETY: The key was live and is now marked dead.
                return Some((key, unsafe { slot.assume_init() }));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.size, Some(self.table.size))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

/// A draining iterator over the entries of a [`LongTable`].
///
/// This struct is created by the [`drain`] method on [`LongTable`]. Entries
/// not consumed are dropped with the iterator.
///
/// [`drain`]: LongTable::drain
pub struct Drain<'a, V> {
    inner: IntoIter<V>,
    _marker: PhantomData<&'a mut LongTable<V>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = (u64, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
impl<V> FusedIterator for Drain<'_, V> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    /// Nothing yielded yet, or the last entry was already removed.
    Nothing,
    /// The last entry was yielded from this slot by the linear scan.
    Slot(usize),
    /// The last entry was yielded from the wrapped buffer.
    Wrapped(u64),
}

/// A cursor over a [`LongTable`] that can remove the entry it last yielded.
///
/// The cursor scans the zero-key slot first and then walks the table from
/// its last slot down to slot `0`. Removing through the cursor compacts the
/// cluster in place; when that pulls a not-yet-visited entry from the start
/// of the table into a slot the cursor has already passed, the entry's key is
/// recorded and yielded after the scan finishes, so no entry is skipped or
/// visited twice.
///
/// Only the cursor may mutate the table while it is alive.
///
/// This struct is created by the [`cursor`] method on [`LongTable`].
///
/// [`cursor`]: LongTable::cursor
pub struct Cursor<'a, V> {
    table: &'a mut LongTable<V>,
    pos: usize,
    remaining: usize,
    must_return_zero: bool,
    last: Last,
    current: Option<(u64, usize)>,
    wrapped: Vec<u64>,
    wrapped_pos: usize,
}

impl<V> Cursor<'_, V> {
    /// Returns `true` if [`advance`](Self::advance) would yield another key.
    pub fn has_next(&self) -> bool {
        self.remaining != 0
    }

    /// Moves to the next entry and returns its key.
    ///
    /// Fails with [`Error::NoSuchElement`] once every entry has been
    /// yielded.
    pub fn advance(&mut self) -> Result<u64, Error> {
        if self.remaining == 0 {
            return Err(Error::NoSuchElement);
        }
        self.remaining -= 1;

        if self.must_return_zero {
            self.must_return_zero = false;
            let n = self.table.n;
            self.last = Last::Slot(n);
            self.current = Some((0, n));
            return Ok(0);
        }

        while self.pos > 0 {
            self.pos -= 1;
            let key = self.table.keys[self.pos];
            if key != 0 {
                self.last = Last::Slot(self.pos);
                self.current = Some((key, self.pos));
                return Ok(key);
            }
        }

        // Whatever is left was shifted behind the scan by an earlier removal.
        let Some(&key) = self.wrapped.get(self.wrapped_pos) else {
            self.remaining = 0;
            return Err(Error::NoSuchElement);
        };
        self.wrapped_pos += 1;
        let pos = self.table.locate(key);
        self.last = Last::Wrapped(key);
        self.current = Some((key, pos));
        Ok(key)
    }

    /// Key of the entry the cursor is on, if it has not been removed.
    pub fn key(&self) -> Option<u64> {
        self.current.map(|(key, _)| key)
    }

    /// Value of the entry the cursor is on, if it has not been removed.
    pub fn value(&self) -> Option<&V> {
        let (_, pos) = self.current?;
        // SAFETY: `current` is cleared whenever its slot stops being live.
        Some(unsafe { self.table.values[pos].assume_init_ref() })
    }

    /// Mutable value of the entry the cursor is on, if it has not been
    /// removed.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        let (_, pos) = self.current?;
        // SAFETY: `current` is cleared whenever its slot stops being live.
        Some(unsafe { self.table.values[pos].assume_init_mut() })
    }

    /// Removes the entry last yielded by [`advance`](Self::advance) and
    /// returns its value.
    ///
    /// Fails with [`Error::IllegalState`] before the first `advance` and
    /// when called twice without an `advance` in between.
    pub fn remove(&mut self) -> Result<V, Error> {
        let value = match core::mem::replace(&mut self.last, Last::Nothing) {
            Last::Nothing => return Err(Error::IllegalState),
            // SAFETY: The slot was live when yielded, and only this cursor
            // has touched the table since.
            Last::Slot(pos) => unsafe { self.table.take_at(pos, Some(&mut self.wrapped)) },
            // The entry no longer sits in the range the scan covers, so it
            // is removed by key.
            Last::Wrapped(key) => self.table.remove(key).ok_or(Error::IllegalState)?,
        };
        self.current = None;
        Ok(value)
    }
}

impl<V> Iterator for Cursor<'_, V> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.advance().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
