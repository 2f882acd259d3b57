use std::cmp::PartialOrd;

/// A pair of elements sorted in increasing order.
///
/// Used as the key of undirected relations, so `(a, b)` and `(b, a)` hash and
/// compare identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SortedPair<T: PartialOrd>([T; 2]);

impl<T: PartialOrd + Copy> SortedPair<T> {
    /// Sorts two elements in increasing order into a new pair.
    pub fn new(element1: T, element2: T) -> Self {
        if element1 > element2 {
            SortedPair([element2, element1])
        } else {
            SortedPair([element1, element2])
        }
    }

    /// The smallest element of this pair.
    #[inline]
    pub fn min(&self) -> T {
        self.0[0]
    }

    /// The largest element of this pair.
    #[inline]
    pub fn max(&self) -> T {
        self.0[1]
    }

    /// Both elements, smallest first.
    #[inline]
    pub fn as_tuple(&self) -> (T, T) {
        (self.0[0], self.0[1])
    }

    /// Does this pair join an element to itself?
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.0[0] == self.0[1]
    }

    /// Given one element of the pair, returns the other one.
    ///
    /// Returns `None` if `elt` is not part of this pair.
    #[inline]
    pub fn other(&self, elt: T) -> Option<T> {
        if self.0[0] == elt {
            Some(self.0[1])
        } else if self.0[1] == elt {
            Some(self.0[0])
        } else {
            None
        }
    }
}
