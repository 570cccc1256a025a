use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::SequenceError;
use crate::iter::{self, Entries, Keys, PositionalIter, Project, Slots, Values};

pub const STRING_TAG: &str = "OrderedSequence";

/// Insertion-ordered, densely indexed container.
///
/// Slots hold `Option<T>`; `None` marks a slot that was allocated by
/// [`with_len`](Self::with_len) but never assigned. Iterators created from a
/// sequence keep a weak handle to its storage, so the sequence can be mutated
/// while they are alive.
pub struct OrderedSequence<T> {
    slots: Rc<Slots<T>>,
}

impl<T> OrderedSequence<T> {
    pub fn new() -> Self {
        Self::from_slots(Vec::new())
    }

    /// Creates a sequence of `len` unset slots.
    pub fn with_len(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self::from_slots(slots)
    }

    pub fn from_elements<I: IntoIterator<Item = T>>(elements: I) -> Self {
        Self::from_slots(elements.into_iter().map(Some).collect())
    }

    fn from_slots(slots: Vec<Option<T>>) -> Self {
        Self {
            slots: Rc::new(RefCell::new(slots)),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn string_tag(&self) -> &'static str {
        STRING_TAG
    }

    /// Appends `elements` in order and returns the new length.
    pub fn append<I: IntoIterator<Item = T>>(&self, elements: I) -> usize {
        // `elements` may read from this sequence; drain it before borrowing mutably.
        let incoming = pending(elements);
        let mut slots = self.slots.borrow_mut();
        let appended = incoming.len();
        slots.extend(incoming);
        tracing::trace!(appended, len = slots.len(), "append");
        slots.len()
    }

    pub fn push(&self, element: T) -> usize {
        let mut slots = self.slots.borrow_mut();
        slots.push(Some(element));
        slots.len()
    }

    /// Removes `delete_count` slots beginning at `start` and inserts `insert`
    /// in their place.
    ///
    /// - A negative `start` counts back from the end and clamps at `0`.
    /// - A `start` past the end clamps to `len`.
    /// - `delete_count` is clamped to the slots remaining after `start`.
    ///
    /// Returns the removed slots, in order, as a new sequence.
    pub fn splice<I: IntoIterator<Item = T>>(
        &self,
        start: isize,
        delete_count: usize,
        insert: I,
    ) -> OrderedSequence<T> {
        let incoming = pending(insert);
        let mut slots = self.slots.borrow_mut();
        let len = slots.len();
        let start = resolve_start(start, len);
        let end = start + delete_count.min(len - start);
        let removed: Vec<Option<T>> = slots.splice(start..end, incoming).collect();
        tracing::debug!(start, removed = removed.len(), len = slots.len(), "splice");
        Self::from_slots(removed)
    }

    /// Replaces the slot at `index`, returning what it held before.
    pub fn set_element(&self, index: usize, element: T) -> Result<Option<T>, SequenceError> {
        let mut slots = self.slots.borrow_mut();
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(SequenceError::IndexOutOfRange { index, len })?;
        Ok(slot.replace(element))
    }

    /// Positional iterator over `(index, slot)` pairs.
    pub fn entries(&self) -> Entries<T>
    where
        T: Clone,
    {
        self.positional(iter::entry::<T>, None)
    }

    pub fn keys(&self) -> Keys<T> {
        self.positional(iter::key::<T>, None)
    }

    /// Positional iterator over elements. Traversal stops at the first unset
    /// slot.
    pub fn values(&self) -> Values<T>
    where
        T: Clone,
    {
        self.positional(iter::value::<T>, None)
    }

    /// Like [`entries`](Self::entries), but starting at `index`. Flipping the
    /// result walks from `index` down to `0`.
    pub fn iterator_for(&self, index: usize) -> Entries<T>
    where
        T: Clone,
    {
        self.positional(iter::entry::<T>, Some(index))
    }

    /// Elements from last to first.
    pub fn reverse_iterator(&self) -> Values<T>
    where
        T: Clone,
    {
        self.values().into_reverse()
    }

    fn positional<I>(&self, project: Project<T, I>, start: Option<usize>) -> PositionalIter<T, I> {
        PositionalIter::new(Rc::downgrade(&self.slots), self.len(), project, start)
    }

    /// Calls `f(element, index, self)` for every index in order.
    ///
    /// The length is re-read before each step, so changes made by `f` are
    /// seen by the rest of the scan.
    pub fn for_each<F>(&self, mut f: F)
    where
        T: Clone,
        F: FnMut(Option<T>, usize, &Self),
    {
        let mut index = 0;
        while let Some(slot) = self.live_slot(index) {
            f(slot, index, self);
            index += 1;
        }
    }

    /// [`for_each`](Self::for_each) with `this_arg` handed to `f` as its
    /// receiver.
    pub fn for_each_with<A, F>(&self, this_arg: &mut A, mut f: F)
    where
        T: Clone,
        A: ?Sized,
        F: FnMut(&mut A, Option<T>, usize, &Self),
    {
        self.for_each(|slot, index, seq| f(this_arg, slot, index, seq));
    }

    /// Calls `f(element, index, self)` from the last index down to `0`.
    ///
    /// Walks a flipped [`entries`](Self::entries) iterator, so the range is
    /// fixed when the call starts.
    pub fn for_each_reverse<F>(&self, mut f: F)
    where
        T: Clone,
        F: FnMut(Option<T>, usize, &Self),
    {
        for (index, slot) in self.entries().reverse_iterator() {
            f(slot, index, self);
        }
    }

    pub fn for_each_reverse_with<A, F>(&self, this_arg: &mut A, mut f: F)
    where
        T: Clone,
        A: ?Sized,
        F: FnMut(&mut A, Option<T>, usize, &Self),
    {
        self.for_each_reverse(|slot, index, seq| f(this_arg, slot, index, seq));
    }

    fn live_slot(&self, index: usize) -> Option<Option<T>>
    where
        T: Clone,
    {
        self.slots.borrow().get(index).cloned()
    }

    /// Element at `index`; `Ok(None)` for an unset slot.
    pub fn element_at(&self, index: usize) -> Result<Option<T>, SequenceError>
    where
        T: Clone,
    {
        let len = self.len();
        self.live_slot(index)
            .ok_or(SequenceError::IndexOutOfRange { index, len })
    }

    /// Element-wise copy of `other`; the two share no storage.
    pub fn copy_of(other: &Self) -> Self
    where
        T: Clone,
    {
        Self::from_slots(other.to_vec())
    }

    pub fn to_vec(&self) -> Vec<Option<T>>
    where
        T: Clone,
    {
        self.slots.borrow().clone()
    }
}

fn pending<T, I: IntoIterator<Item = T>>(elements: I) -> Vec<Option<T>> {
    elements.into_iter().map(Some).collect()
}

fn resolve_start(start: isize, len: usize) -> usize {
    if start < 0 {
        len.saturating_sub(start.unsigned_abs())
    } else {
        (start as usize).min(len)
    }
}

impl<T> Default for OrderedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for OrderedSequence<T> {
    fn clone(&self) -> Self {
        Self::copy_of(self)
    }
}

impl<T> From<Vec<T>> for OrderedSequence<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::from_elements(elements)
    }
}

impl<T> FromIterator<T> for OrderedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_elements(iter)
    }
}

impl<T> Extend<T> for OrderedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append(iter);
    }
}

impl<'a, T: Clone> IntoIterator for &'a OrderedSequence<T> {
    type Item = T;
    type IntoIter = Values<T>;

    fn into_iter(self) -> Values<T> {
        self.values()
    }
}

impl<T: PartialEq> PartialEq for OrderedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slots, &other.slots) || *self.slots.borrow() == *other.slots.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(STRING_TAG).field(&*self.slots.borrow()).finish()
    }
}

impl<T> fmt::Display for OrderedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {STRING_TAG}]")
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderedSequence, STRING_TAG};
    use crate::SequenceError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn letters() -> OrderedSequence<char> {
        OrderedSequence::from_elements(['a', 'b', 'c', 'd', 'e'])
    }

    #[test]
    fn construction_variants() {
        let empty: OrderedSequence<u32> = OrderedSequence::new();
        assert_eq!(empty.len(), 0);
        assert!(empty.is_empty());

        let sized: OrderedSequence<u32> = OrderedSequence::with_len(3);
        assert_eq!(sized.len(), 3);
        for index in 0..3 {
            assert_eq!(sized.element_at(index), Ok(None));
        }

        let listed = OrderedSequence::from_elements([1, 2, 3]);
        assert_eq!(listed.to_vec(), vec![Some(1), Some(2), Some(3)]);

        let copied = OrderedSequence::copy_of(&listed);
        listed.push(4);
        assert_eq!(copied.to_vec(), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(listed.len(), 4);
    }

    #[test]
    fn copy_keeps_unset_slots() {
        let sized: OrderedSequence<&str> = OrderedSequence::with_len(2);
        sized.set_element(1, "x").unwrap();
        let copied = sized.clone();
        assert_eq!(copied.to_vec(), vec![None, Some("x")]);
        assert_eq!(copied, sized);
    }

    #[test]
    fn element_at_out_of_range() {
        let seq = OrderedSequence::from_elements(["1", "2"]);
        assert_eq!(seq.element_at(1), Ok(Some("2")));
        assert_eq!(
            seq.element_at(2),
            Err(SequenceError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            seq.set_element(9, "x"),
            Err(SequenceError::IndexOutOfRange { index: 9, len: 2 })
        );
        assert_eq!(seq.set_element(0, "x"), Ok(Some("1")));
        assert_eq!(seq.element_at(0), Ok(Some("x")));
    }

    #[test]
    fn traversal_entry_points() {
        let seq = OrderedSequence::from_elements(["1", "2", "3"]);
        assert_eq!(seq.values().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!((&seq).into_iter().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(seq.keys().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(
            seq.entries().collect::<Vec<_>>(),
            vec![(0, Some("1")), (1, Some("2")), (2, Some("3"))]
        );
        assert_eq!(seq.reverse_iterator().collect::<Vec<_>>(), vec!["3", "2", "1"]);
        assert_eq!(seq.keys().into_reverse().collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(
            seq.entries().reverse_iterator().collect::<Vec<_>>(),
            vec![(2, Some("3")), (1, Some("2")), (0, Some("1"))]
        );

        let mut seen = Vec::new();
        for value in &seq {
            seen.push(value);
        }
        assert_eq!(seen, vec!["1", "2", "3"]);
    }

    #[test]
    fn iterator_for_forward_and_flipped() {
        let seq = letters();
        assert_eq!(
            seq.iterator_for(3).collect::<Vec<_>>(),
            vec![(3, Some('d')), (4, Some('e'))]
        );

        let mut it = seq.iterator_for(2).into_reverse();
        assert_eq!(it.next(), Some((2, Some('c'))));
        assert_eq!(it.next(), Some((1, Some('b'))));
        assert_eq!(it.next(), Some((0, Some('a'))));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn splice_then_append() {
        let seq = OrderedSequence::from_elements(["1", "2", "3"]);
        let removed = seq.splice(1, 1, []);
        assert_eq!(removed.to_vec(), vec![Some("2")]);
        assert_eq!(seq.values().collect::<Vec<_>>(), vec!["1", "3"]);

        assert_eq!(seq.append(["4", "5", "6"]), 5);
        assert_eq!(seq.values().collect::<Vec<_>>(), vec!["1", "3", "4", "5", "6"]);
    }

    #[test]
    fn splice_clamps_arguments() {
        let seq = OrderedSequence::from_elements(1..=5);
        let removed = seq.splice(-2, 10, [8, 9]);
        assert_eq!(removed.to_vec(), vec![Some(4), Some(5)]);
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![1, 2, 3, 8, 9]);

        let removed = seq.splice(-100, 1, []);
        assert_eq!(removed.to_vec(), vec![Some(1)]);

        let removed = seq.splice(100, 3, [0]);
        assert!(removed.is_empty());
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![2, 3, 8, 9, 0]);

        let removed = seq.splice(1, 0, [7]);
        assert!(removed.is_empty());
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![2, 7, 3, 8, 9, 0]);
    }

    #[test]
    fn splice_matches_vec_oracle() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        let seq = OrderedSequence::new();
        let mut oracle: Vec<u32> = Vec::new();

        for _ in 0..2_000 {
            let len = oracle.len() as isize;
            let start = rng.random_range(-(len as i64) - 2..=len as i64 + 2) as isize;
            let delete_count = rng.random_range(0..4_usize);
            let insert: Vec<u32> = (0..rng.random_range(0..4)).map(|_| rng.random()).collect();

            let lo = if start < 0 {
                (len + start).max(0) as usize
            } else {
                (start as usize).min(oracle.len())
            };
            let hi = lo + delete_count.min(oracle.len() - lo);
            let expected: Vec<u32> = oracle.splice(lo..hi, insert.iter().copied()).collect();

            let removed = seq.splice(start, delete_count, insert);
            assert_eq!(removed.values().collect::<Vec<_>>(), expected);
            assert_eq!(seq.len(), oracle.len());
        }
        assert_eq!(seq.values().collect::<Vec<_>>(), oracle);
    }

    #[test]
    fn append_and_splice_from_own_iterators() {
        let seq = OrderedSequence::from_elements([1, 2]);
        assert_eq!(seq.append(seq.values()), 4);
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![1, 2, 1, 2]);

        let seq = OrderedSequence::from_elements([10_usize, 20]);
        assert!(seq.splice(0, 0, seq.keys()).is_empty());
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![0, 1, 10, 20]);

        let removed = seq.splice(-1, 1, seq.reverse_iterator());
        assert_eq!(removed.to_vec(), vec![Some(20)]);
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![0, 1, 10, 20, 10, 1, 0]);
    }

    #[test]
    fn iterators_keep_their_bound_across_mutation() {
        let seq = OrderedSequence::from_elements([1, 2, 3]);
        let mut values = seq.values();
        let keys = seq.keys();
        assert_eq!(values.next(), Some(1));

        seq.append([4, 5]);
        seq.set_element(2, 30).unwrap();
        assert_eq!(values.by_ref().collect::<Vec<_>>(), vec![2, 30]);
        assert_eq!(keys.collect::<Vec<_>>(), vec![0, 1, 2]);

        let mut entries = seq.entries();
        assert_eq!(entries.next(), Some((0, Some(1))));
        seq.splice(0, 1, []);
        assert_eq!(entries.next(), Some((1, Some(30))));
        assert_eq!(entries.next(), Some((2, Some(4))));
        assert_eq!(entries.next(), Some((3, Some(5))));
        // Shrunk below the frozen bound: the slot reads as unset.
        assert_eq!(entries.next(), Some((4, None)));
        assert_eq!(entries.next(), None);
    }

    #[test]
    fn values_stop_at_unset_slot() {
        let seq: OrderedSequence<u8> = OrderedSequence::with_len(3);
        assert_eq!(seq.values().next(), None);
        assert_eq!(seq.keys().count(), 3);

        seq.set_element(0, 7).unwrap();
        assert_eq!(seq.values().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn iterator_outlives_sequence() {
        let seq = OrderedSequence::from_elements([1, 2]);
        let mut values = seq.values();
        drop(seq);
        assert_eq!(values.next(), None);
    }

    #[test]
    fn for_each_visits_in_order() {
        let seq = OrderedSequence::from_elements(['a', 'b', 'c']);
        let mut seen = Vec::new();
        seq.for_each(|value, index, receiver| {
            assert_eq!(receiver.len(), 3);
            seen.push((value, index));
        });
        assert_eq!(seen, vec![(Some('a'), 0), (Some('b'), 1), (Some('c'), 2)]);
    }

    #[test]
    fn for_each_with_binds_receiver() {
        let seq = OrderedSequence::from_elements(['a', 'b', 'c']);
        let mut receiver: Vec<(char, usize)> = Vec::new();
        seq.for_each_with(&mut receiver, |this, value, index, _| {
            this.push((value.unwrap(), index));
        });
        assert_eq!(receiver, vec![('a', 0), ('b', 1), ('c', 2)]);

        let mut reversed = String::new();
        seq.for_each_reverse_with(&mut reversed, |this, value, _, _| {
            this.extend(value);
        });
        assert_eq!(reversed, "cba");
    }

    #[test]
    fn for_each_reads_length_live() {
        let seq = OrderedSequence::from_elements([1, 2, 3]);
        let mut seen = Vec::new();
        seq.for_each(|value, index, receiver| {
            if index == 0 {
                receiver.push(4);
            }
            if index == 1 {
                receiver.splice(2, 1, []);
            }
            seen.push(value.unwrap());
        });
        assert_eq!(seen, vec![1, 2, 4]);
    }

    #[test]
    fn for_each_reverse_visits_backwards() {
        let seq = OrderedSequence::from_elements(['a', 'b', 'c']);
        let mut seen = Vec::new();
        seq.for_each_reverse(|value, index, _| seen.push((value.unwrap(), index)));
        assert_eq!(seen, vec![('c', 2), ('b', 1), ('a', 0)]);
    }

    #[test]
    fn for_each_reverse_range_is_fixed() {
        let seq = OrderedSequence::from_elements([1, 2, 3]);
        let mut seen = Vec::new();
        seq.for_each_reverse(|value, index, receiver| {
            if index == 2 {
                receiver.push(99);
            }
            seen.push((value, index));
        });
        assert_eq!(seen, vec![(Some(3), 2), (Some(2), 1), (Some(1), 0)]);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn string_tag_and_formatting() {
        let seq: OrderedSequence<i32> = OrderedSequence::new();
        assert_eq!(seq.string_tag(), STRING_TAG);
        assert_eq!(seq.to_string(), "[object OrderedSequence]");

        let seq = OrderedSequence::from_elements([1]);
        assert_eq!(format!("{seq:?}"), "OrderedSequence([Some(1)])");
    }

    #[test]
    fn collect_and_extend() {
        let mut seq: OrderedSequence<u8> = (1..=3).collect();
        seq.extend([4, 5]);
        assert_eq!(seq.len(), 5);
        assert_eq!(OrderedSequence::from(vec![1, 2, 3, 4, 5]), seq);
    }
}
