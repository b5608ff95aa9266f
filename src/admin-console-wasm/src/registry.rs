use smallvec::SmallVec;

use crate::types::CONTROL_COUNT;

/// Live handler bindings keyed by control.
///
/// At most one binding exists per key. Bindings release themselves when
/// dropped, so replacing or removing an entry detaches the old handler.
pub struct HandlerRegistry<K, H> {
    bindings: SmallVec<[(K, H); CONTROL_COUNT]>,
}

impl<K: PartialEq + Copy, H> HandlerRegistry<K, H> {
    pub fn new() -> Self {
        Self {
            bindings: SmallVec::new(),
        }
    }

    /// Install `handler` for `key`, dropping whatever was bound before
    pub fn rebind(&mut self, key: K, handler: H) {
        match self.bindings.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = handler,
            None => self.bindings.push((key, handler)),
        }
    }

    pub fn unbind(&mut self, key: K) -> bool {
        match self.bindings.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                self.bindings.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn is_bound(&self, key: K) -> bool {
        self.bindings.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: PartialEq + Copy, H> Default for HandlerRegistry<K, H> {
    fn default() -> Self {
        Self::new()
    }
}
