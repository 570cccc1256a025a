use std::cell::RefCell;
use std::iter::FusedIterator;
use std::rc::Weak;

pub(crate) type Slots<T> = RefCell<Vec<Option<T>>>;

/// Maps a position and the slot stored there (if any) to the yielded value.
/// Returning `None` ends the traversal.
pub type Project<T, I> = fn(usize, Option<&T>) -> Option<I>;

/// Resumable cursor over the index space of an [`OrderedSequence`].
///
/// - The upper bound is frozen when the iterator is created. Elements
///   appended later are never visited and a shrunk sequence never panics.
/// - Slots are read live on every step, so replaced elements are observed.
/// - [`reverse_iterator`](Self::reverse_iterator) flips the direction in place.
///
/// [`OrderedSequence`]: crate::OrderedSequence
pub struct PositionalIter<T, I> {
    source: Weak<Slots<T>>,
    project: Project<T, I>,
    current: isize,
    start: Option<usize>,
    last: isize,
    step: isize,
    exhausted: bool,
}

pub type Entries<T> = PositionalIter<T, (usize, Option<T>)>;
pub type Keys<T> = PositionalIter<T, usize>;
pub type Values<T> = PositionalIter<T, T>;

impl<T, I> PositionalIter<T, I> {
    pub(crate) fn new(
        source: Weak<Slots<T>>,
        len: usize,
        project: Project<T, I>,
        start: Option<usize>,
    ) -> Self {
        Self {
            source,
            project,
            current: start.map_or(0, to_cursor),
            start,
            last: to_cursor(len) - 1,
            step: 1,
            exhausted: false,
        }
    }

    /// Flips traversal to run backwards and rewinds the cursor.
    ///
    /// The cursor restarts at the seeded start index if there is one,
    /// otherwise at the last index captured on creation. Calling this again
    /// rewinds again; it does not toggle the direction.
    pub fn reverse_iterator(&mut self) -> &mut Self {
        self.current = self.start.map_or(self.last, to_cursor);
        self.step = -1;
        self.exhausted = false;
        tracing::trace!(cursor = self.current, last = self.last, "iterator flipped");
        self
    }

    /// By-value [`reverse_iterator`](Self::reverse_iterator).
    pub fn into_reverse(mut self) -> Self {
        self.reverse_iterator();
        self
    }

    pub fn start_index(&self) -> Option<usize> {
        self.start
    }

    /// Last index visible to this iterator, or `None` if it was created over
    /// an empty sequence.
    pub fn last_index(&self) -> Option<usize> {
        usize::try_from(self.last).ok()
    }

    pub fn is_reversed(&self) -> bool {
        self.step < 0
    }

    fn in_bounds(&self) -> bool {
        0 <= self.current && self.current <= self.last
    }

    fn read(&self, index: usize) -> Option<I> {
        match self.source.upgrade() {
            Some(slots) => {
                let slots = slots.borrow();
                (self.project)(index, slots.get(index).and_then(Option::as_ref))
            }
            None => (self.project)(index, None),
        }
    }
}

/// A missing value doubles as the end-of-traversal signal, so an unset slot
/// read through `values()` ends iteration early.
#[inline]
fn signals_exhaustion<I>(value: &Option<I>) -> bool {
    value.is_none()
}

#[inline]
fn to_cursor(index: usize) -> isize {
    isize::try_from(index).unwrap_or(isize::MAX)
}

impl<T, I> Iterator for PositionalIter<T, I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        if self.exhausted {
            return None;
        }
        let mut value = None;
        if self.in_bounds() {
            value = self.read(self.current as usize);
            self.current += self.step;
        }
        if signals_exhaustion(&value) {
            self.exhausted = true;
        }
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted || !self.in_bounds() {
            return (0, Some(0));
        }
        let remaining = if self.step > 0 {
            self.last - self.current + 1
        } else {
            self.current + 1
        };
        (0, Some(remaining as usize))
    }
}

impl<T, I> FusedIterator for PositionalIter<T, I> {}

pub(crate) fn entry<T: Clone>(index: usize, slot: Option<&T>) -> Option<(usize, Option<T>)> {
    Some((index, slot.cloned()))
}

pub(crate) fn key<T>(index: usize, _slot: Option<&T>) -> Option<usize> {
    Some(index)
}

pub(crate) fn value<T: Clone>(_index: usize, slot: Option<&T>) -> Option<T> {
    slot.cloned()
}
