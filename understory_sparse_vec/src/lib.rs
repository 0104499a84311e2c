// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Sparse Vec: a bitfield-indexed sparse associative container.
//!
//! [`SparseVector`] maps a small, bounded set of field identifiers to optional
//! values. Only present values are stored, packed in ascending field order in a
//! single vector; a 32-bit bitfield records which fields are present. The
//! storage index of a field is the number of present fields below it, so a
//! lookup is one mask and one population count.
//!
//! This layout suits objects with many *possible* slots of which only a few are
//! populated in practice, such as per-object paint property nodes.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_sparse_vec::{FieldId, SparseVector};
//!
//! #[derive(Copy, Clone, Debug, PartialEq, Eq)]
//! enum Slot {
//!     Width,
//!     Height,
//!     Color,
//! }
//!
//! impl FieldId for Slot {
//!     const NUM_FIELDS: usize = 3;
//!
//!     fn index(self) -> usize {
//!         self as usize
//!     }
//! }
//!
//! let mut fields = SparseVector::<Slot, u32>::new();
//! fields.set_field(Slot::Color, 0xff00ff);
//! fields.set_field(Slot::Width, 100);
//!
//! assert!(fields.has_field(Slot::Width));
//! assert!(!fields.has_field(Slot::Height));
//! assert_eq!(*fields.get_field(Slot::Color), 0xff00ff);
//! assert_eq!(fields.len(), 2);
//!
//! assert!(fields.clear_field(Slot::Width));
//! assert!(!fields.clear_field(Slot::Width));
//! ```
//!
//! ## Bounds
//!
//! The bitfield is 32 bits wide, so [`FieldId::NUM_FIELDS`] must not exceed 32.
//! This is checked when a vector is constructed, which fails the build for an
//! oversized field enum:
//!
//! ```compile_fail
//! use understory_sparse_vec::{FieldId, SparseVector};
//!
//! #[derive(Copy, Clone)]
//! struct Wide(u8);
//!
//! impl FieldId for Wide {
//!     const NUM_FIELDS: usize = 33;
//!
//!     fn index(self) -> usize {
//!         self.0 as usize
//!     }
//! }
//!
//! let _ = SparseVector::<Wide, u8>::new();
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use core::ops::RangeInclusive;

/// Width of the presence bitfield.
pub const BITFIELD_WIDTH: usize = u32::BITS as usize;

/// Capacity reserved on the first insertion.
///
/// Smaller than `Vec`'s default growth step; sparse containers usually hold
/// one or two entries.
const INITIAL_CAPACITY: usize = 2;

/// A bounded field identifier usable as a [`SparseVector`] key.
///
/// Implementations are typically fieldless enums. `index` must return a value
/// in `0..NUM_FIELDS`, and distinct identifiers must map to distinct indices.
pub trait FieldId: Copy {
    /// Number of distinct field identifiers. Must be at most [`BITFIELD_WIDTH`].
    const NUM_FIELDS: usize;

    /// Returns the dense index of this field.
    fn index(self) -> usize;
}

/// A sparse map from a bounded [`FieldId`] to values of type `T`.
///
/// Present values are kept in ascending field order. Insertion and removal
/// shift later entries; overwriting a present field does not reorder anything.
pub struct SparseVector<F, T> {
    fields: Vec<T>,
    bits: u32,
    _marker: PhantomData<fn() -> F>,
}

impl<F: FieldId, T> SparseVector<F, T> {
    /// Creates an empty sparse vector. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        const {
            assert!(
                F::NUM_FIELDS <= BITFIELD_WIDTH,
                "FieldId::NUM_FIELDS exceeds the sparse vector bitfield width"
            );
        }
        Self {
            fields: Vec::new(),
            bits: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of present fields.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is present.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the allocated capacity of the packed storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.fields.capacity()
    }

    /// Returns the raw presence bitfield.
    #[must_use]
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns `true` if `id` is present.
    #[must_use]
    #[inline]
    pub fn has_field(&self, id: F) -> bool {
        self.bits & Self::bit_for(id) != 0
    }

    /// Returns `true` if any field in `range` (inclusive, by index) is present.
    #[must_use]
    pub fn has_any_field_in(&self, range: RangeInclusive<F>) -> bool {
        let (first, last) = (range.start().index(), range.end().index());
        debug_assert!(first <= last, "empty field range {first}..={last}");
        debug_assert!(last < BITFIELD_WIDTH, "field index {last} out of range");
        let high = u32::MAX >> (BITFIELD_WIDTH - 1 - last);
        let low = u32::MAX << first;
        self.bits & high & low != 0
    }

    /// Returns the value of `id`, or `None` if it is absent.
    #[must_use]
    #[inline]
    pub fn field(&self, id: F) -> Option<&T> {
        if self.has_field(id) {
            Some(&self.fields[self.storage_index(id)])
        } else {
            None
        }
    }

    /// Returns a mutable reference to the value of `id`, or `None` if it is absent.
    #[must_use]
    #[inline]
    pub fn field_mut(&mut self, id: F) -> Option<&mut T> {
        if self.has_field(id) {
            let index = self.storage_index(id);
            Some(&mut self.fields[index])
        } else {
            None
        }
    }

    /// Returns the value of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is absent, in all build modes.
    #[track_caller]
    #[must_use]
    pub fn get_field(&self, id: F) -> &T {
        match self.field(id) {
            Some(value) => value,
            None => missing_field(id.index()),
        }
    }

    /// Returns a mutable reference to the value of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is absent, in all build modes.
    #[track_caller]
    #[must_use]
    pub fn get_field_mut(&mut self, id: F) -> &mut T {
        let index = id.index();
        match self.field_mut(id) {
            Some(value) => value,
            None => missing_field(index),
        }
    }

    /// Sets the value of `id`, overwriting any existing value in place.
    pub fn set_field(&mut self, id: F, value: T) {
        let index = self.storage_index(id);
        if self.has_field(id) {
            self.fields[index] = value;
            return;
        }
        if self.fields.capacity() == 0 {
            self.fields.reserve_exact(INITIAL_CAPACITY);
        }
        self.fields.insert(index, value);
        self.bits |= Self::bit_for(id);
    }

    /// Removes `id` and returns its value, if it was present.
    pub fn take_field(&mut self, id: F) -> Option<T> {
        if !self.has_field(id) {
            return None;
        }
        let index = self.storage_index(id);
        self.bits &= !Self::bit_for(id);
        Some(self.fields.remove(index))
    }

    /// Removes `id`.
    ///
    /// Returns `true` if a value was removed.
    pub fn clear_field(&mut self, id: F) -> bool {
        self.take_field(id).is_some()
    }

    /// Removes every field, keeping the allocation.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.bits = 0;
    }

    /// Iterates over `(field index, value)` pairs in ascending field order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            bits: self.bits,
            values: self.fields.iter(),
        }
    }

    #[inline]
    fn bit_for(id: F) -> u32 {
        let index = id.index();
        debug_assert!(
            index < F::NUM_FIELDS,
            "field index {index} out of range for {} fields",
            F::NUM_FIELDS
        );
        1_u32 << index
    }

    #[inline]
    fn storage_index(&self, id: F) -> usize {
        let below = Self::bit_for(id) - 1;
        (self.bits & below).count_ones() as usize
    }
}

#[cold]
#[track_caller]
fn missing_field(index: usize) -> ! {
    panic!("precondition violated: sparse vector field {index} is not present")
}

impl<F: FieldId, T> Default for SparseVector<F, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, T: Clone> Clone for SparseVector<F, T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            bits: self.bits,
            _marker: PhantomData,
        }
    }
}

impl<F, T: PartialEq> PartialEq for SparseVector<F, T> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits && self.fields == other.fields
    }
}

impl<F, T: Eq> Eq for SparseVector<F, T> {}

impl<F: FieldId, T: fmt::Debug> fmt::Debug for SparseVector<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over the present fields of a [`SparseVector`].
#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    bits: u32,
    values: core::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let index = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        self.values.next().map(|value| (index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Id(u8);

    impl FieldId for Id {
        const NUM_FIELDS: usize = 32;

        fn index(self) -> usize {
            usize::from(self.0)
        }
    }

    fn stored<T: Copy>(v: &SparseVector<Id, T>) -> Vec<T> {
        v.iter().map(|(_, value)| *value).collect()
    }

    #[test]
    fn out_of_order_inserts_are_stored_ascending() {
        let mut v = SparseVector::<Id, char>::new();
        v.set_field(Id(20), 'a');
        v.set_field(Id(2), 'b');
        v.set_field(Id(31), 'c');

        assert_eq!(*v.get_field(Id(20)), 'a');
        assert_eq!(*v.get_field(Id(2)), 'b');
        assert_eq!(*v.get_field(Id(31)), 'c');
        assert_eq!(v.len(), 3);
        assert_eq!(stored(&v), vec!['b', 'a', 'c']);
    }

    #[test]
    fn overwrite_keeps_position_and_size() {
        let mut v = SparseVector::<Id, u32>::new();
        v.set_field(Id(4), 1);
        v.set_field(Id(9), 2);
        v.set_field(Id(4), 10);

        assert_eq!(v.len(), 2);
        assert_eq!(stored(&v), vec![10, 2]);
    }

    #[test]
    fn clear_reports_whether_anything_was_removed() {
        let mut v = SparseVector::<Id, u32>::new();
        assert!(!v.clear_field(Id(3)));
        assert_eq!(v.len(), 0);

        v.set_field(Id(3), 7);
        v.set_field(Id(5), 8);
        assert!(v.clear_field(Id(3)));
        assert_eq!(v.len(), 1);
        assert!(!v.clear_field(Id(3)));
        assert_eq!(v.len(), 1);
        assert_eq!(*v.get_field(Id(5)), 8);
    }

    #[test]
    fn first_insert_reserves_small_capacity() {
        let mut v = SparseVector::<Id, u64>::new();
        assert_eq!(v.capacity(), 0);
        v.set_field(Id(0), 1);
        assert_eq!(v.capacity(), INITIAL_CAPACITY);
    }

    #[test]
    fn full_width_field_set_fits() {
        let mut v = SparseVector::<Id, u8>::new();
        for i in (0..32_u8).rev() {
            v.set_field(Id(i), i);
        }
        assert_eq!(v.len(), 32);
        assert_eq!(v.bits(), u32::MAX);
        assert_eq!(*v.get_field(Id(31)), 31);
        assert_eq!(*v.get_field(Id(0)), 0);
    }

    #[test]
    fn range_queries_respect_bounds() {
        let mut v = SparseVector::<Id, u8>::new();
        v.set_field(Id(12), 0);
        assert!(v.has_any_field_in(Id(0)..=Id(12)));
        assert!(v.has_any_field_in(Id(12)..=Id(31)));
        assert!(!v.has_any_field_in(Id(0)..=Id(11)));
        assert!(!v.has_any_field_in(Id(13)..=Id(31)));

        v.set_field(Id(31), 1);
        assert!(v.has_any_field_in(Id(31)..=Id(31)));
    }

    #[test]
    #[should_panic(expected = "precondition violated")]
    fn get_absent_field_panics() {
        let v = SparseVector::<Id, u8>::new();
        let _ = v.get_field(Id(1));
    }

    #[test]
    fn field_mut_edits_in_place() {
        let mut v = SparseVector::<Id, u32>::new();
        assert!(v.field_mut(Id(6)).is_none());
        v.set_field(Id(6), 1);
        *v.get_field_mut(Id(6)) += 41;
        assert_eq!(v.field(Id(6)), Some(&42));
    }

    #[test]
    fn random_sequences_match_a_dense_model() {
        let mut v = SparseVector::<Id, u32>::new();
        let mut model = [None::<u32>; 32];
        // Small LCG so the sequence is reproducible.
        let mut seed = 0x2545_f491_u32;
        for step in 0..2_000_u32 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let id = Id(u8::try_from((seed >> 8) % 32).unwrap());
            if (seed >> 20) % 3 == 0 {
                let removed = v.clear_field(id);
                assert_eq!(removed, model[id.index()].take().is_some());
            } else {
                v.set_field(id, step);
                model[id.index()] = Some(step);
            }

            assert_eq!(v.len(), v.bits().count_ones() as usize);
            for (index, expected) in model.iter().enumerate() {
                let id = Id(u8::try_from(index).unwrap());
                assert_eq!(v.field(id).copied(), *expected);
            }
            let indices: Vec<usize> = v.iter().map(|(index, _)| index).collect();
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
