//! Cyclic cursor over the VM list.
//!
//! Advances on every call and wraps modulo the pool size. A fresh cursor
//! is created per `schedule` call, so policies built on it stay stateless.

/// Wrapping index selector.
#[derive(Debug, Default)]
pub struct CyclicCursor {
    counter: usize,
}

impl CyclicCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the next index, wrapping around `count`.
    ///
    /// Returns `None` if count is zero.
    pub fn next(&mut self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let idx = self.counter % count;
        self.counter = self.counter.wrapping_add(1);
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_indices() {
        let mut cursor = CyclicCursor::new();

        assert_eq!(cursor.next(3), Some(0));
        assert_eq!(cursor.next(3), Some(1));
        assert_eq!(cursor.next(3), Some(2));
        assert_eq!(cursor.next(3), Some(0)); // wraps
    }

    #[test]
    fn zero_count_returns_none() {
        let mut cursor = CyclicCursor::new();
        assert_eq!(cursor.next(0), None);
        // a rejected call does not advance
        assert_eq!(cursor.next(2), Some(0));
    }

    #[test]
    fn single_slot() {
        let mut cursor = CyclicCursor::new();
        for _ in 0..10 {
            assert_eq!(cursor.next(1), Some(0));
        }
    }
}
