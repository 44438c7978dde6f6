/// A simple slab of task entries.
///
/// A `Slab` stores values in a contiguous vector and hands out indices that
/// stay valid until the value is removed. Freed indices are reused by later
/// insertions, so the scheduler keeps a compact task table even when tasks
/// come and go every tick.
pub(crate) struct Slab<T> {
    /// Storage for entries; `None` marks a free slot.
    items: Vec<Option<T>>,
    /// Stack of free indices that can be reused.
    free: Vec<usize>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates a slab with `size` free slots.
    pub(crate) fn new(size: usize) -> Self {
        let items = (0..size).map(|_| None).collect();
        let free = (0..size).rev().collect();

        Self {
            items,
            free,
            len: 0,
        }
    }

    /// Inserts a value and returns its index.
    ///
    /// If a free slot is available, it is reused. Otherwise, the slab grows
    /// by doubling.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                let len = self.items.len();
                let new_len = if len == 0 { 1 } else { 2 * len };

                self.items.extend((len..new_len).map(|_| None));
                self.free.extend(((len + 1)..new_len).rev());

                len
            }
        };

        self.items[index] = Some(item);
        self.len += 1;

        index
    }

    /// Removes and returns the value stored at `index`.
    ///
    /// Returns `None` if the slot is out of range or already free.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;

        self.free.push(index);
        self.len -= 1;

        Some(item)
    }

    /// Returns a mutable reference to the value at `index`, if occupied.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)?.as_mut()
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of the occupied slots, in ascending order.
    pub(crate) fn keys(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.as_ref().map(|_| i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Slab;

    #[test]
    fn freed_slots_are_reused() {
        let mut slab = Slab::new(2);

        let a = slab.insert("a");
        let b = slab.insert("b");
        assert_eq!((a, b), (0, 1));

        assert_eq!(slab.remove(a), Some("a"));
        assert_eq!(slab.remove(a), None);
        assert_eq!(slab.insert("c"), a);
        assert_eq!(slab.len(), 2);
    }

    #[test]
    fn grows_when_full() {
        let mut slab = Slab::new(0);

        for i in 0..5 {
            assert_eq!(slab.insert(i), i);
        }

        assert_eq!(slab.keys(), vec![0, 1, 2, 3, 4]);
        *slab.get_mut(3).unwrap() = 30;
        assert_eq!(slab.remove(3), Some(30));
        assert_eq!(slab.keys(), vec![0, 1, 2, 4]);
        assert!(slab.get_mut(3).is_none());
    }

    #[test]
    fn empty_after_removing_everything() {
        let mut slab = Slab::new(1);
        let i = slab.insert(());

        assert!(!slab.is_empty());
        slab.remove(i);
        assert!(slab.is_empty());
        assert!(slab.keys().is_empty());
    }
}
