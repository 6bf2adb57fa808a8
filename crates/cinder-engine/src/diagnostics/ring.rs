use std::collections::VecDeque;

/// Fixed-capacity ring buffer. Pushing into a full buffer evicts the oldest
/// value.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `value`, returning the evicted value if the buffer was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed value.
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl RingBuffer<f64> {
    /// Arithmetic mean of the stored values, or 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.items.iter().sum::<f64>() / self.items.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_capacity_values() {
        let mut ring = RingBuffer::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            ring.push(v);
        }
        assert_eq!(ring.to_vec(), vec![3.0, 4.0, 5.0]);
        assert_eq!(ring.mean(), 4.0);
    }

    #[test]
    fn push_reports_evicted_value() {
        let mut ring = RingBuffer::new(2);
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert!(ring.is_full());
        assert_eq!(ring.push(3), Some(1));
        assert_eq!(ring.last(), Some(&3));
    }

    #[test]
    fn empty_mean_is_zero() {
        let ring: RingBuffer<f64> = RingBuffer::new(4);
        assert_eq!(ring.mean(), 0.0);
        assert!(ring.is_empty());
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut ring = RingBuffer::new(0);
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.to_vec(), vec![2]);
    }
}
