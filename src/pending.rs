/// Group
///
/// Values waiting for partners so they can be packed `N` at a time into one
/// bank or element. A group never holds `N` values: the value that would
/// complete it is handed out together with the buffered ones instead of being
/// stored, so the caller can write the group first and only then `clear()`.
#[derive(Debug, Clone, Copy)]
pub struct Group<T, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> Group<T, N> {
    pub fn new() -> Group<T, N> {
        Group {
            items: [T::default(); N],
            len: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// The complete group if `val` fills the last free slot.
    pub fn completes(&self, val: T) -> Option<[T; N]> {
        if self.len + 1 < N {
            return None;
        }

        let mut items = self.items;
        items[self.len] = val;
        Some(items)
    }

    /// Buffer `val`. Must only be called when `completes(val)` is `None`.
    pub fn push(&mut self, val: T) {
        debug_assert!(self.len + 1 < N);
        self.items[self.len] = val;
        self.len += 1;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The buffered values with every free slot holding a copy of the first
    /// one, or `None` if nothing is buffered.
    ///
    /// Matching an id twice is harmless, so this is how a partial group is
    /// flushed.
    pub fn padded(&self) -> Option<[T; N]> {
        if self.is_empty() {
            return None;
        }

        let mut items = self.items;
        for slot in items.iter_mut().skip(self.len) {
            *slot = self.items[0];
        }
        Some(items)
    }
}

impl<T: Copy + Default, const N: usize> Default for Group<T, N> {
    fn default() -> Self {
        Group::new()
    }
}
