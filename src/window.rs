use std::collections::VecDeque;
use std::fmt;

/// Bounded FIFO, oldest first. Pushing into a full window evicts the oldest item.
pub struct SlidingWindow<T> {
    deque: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> Clone for SlidingWindow<T> {
    fn clone(&self) -> Self {
        Self {
            deque: self.deque.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SlidingWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deque.fmt(f)
    }
}

impl<T> SlidingWindow<T> {
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            deque: VecDeque::with_capacity(cap),
            capacity: cap,
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.deque.pop_front()
        } else {
            None
        };

        self.deque.push_back(item);

        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.deque.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.deque.len() >= self.capacity
    }

    /// Removes the most recent item.
    #[inline]
    pub fn pop_newest(&mut self) -> Option<T> {
        self.deque.pop_back()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'_ T> {
        self.deque.iter()
    }
}

impl<T: Clone> SlidingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.deque.iter().cloned().collect()
    }
}

impl<T> Extend<T> for SlidingWindow<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut w = SlidingWindow::with_capacity(3);
        assert_eq!(w.push(1), None);
        assert_eq!(w.push(2), None);
        assert_eq!(w.push(3), None);
        assert!(w.is_full());

        assert_eq!(w.push(4), Some(1));
        assert_eq!(w.to_vec(), vec![2, 3, 4]);
    }

    #[test]
    fn test_pop_newest_and_extend() {
        let mut w = SlidingWindow::with_capacity(4);
        w.extend([1, 2, 3, 4]);
        assert_eq!(w.pop_newest(), Some(4));

        w.extend([5, 6, 7]);
        assert_eq!(w.to_vec(), vec![3, 5, 6, 7]);
        assert_eq!(w.len(), 4);
    }
}
