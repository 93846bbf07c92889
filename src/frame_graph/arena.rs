//! Storage for tracked objects, addressed by [`NodeId`].

use super::node::{NodeAllocator, NodeId};
use crate::resources::Resource;

/// Slot storage for every registered object.
///
/// The graph itself only sees ids; payloads live here until their handle is
/// released.
#[derive(Debug, Default)]
pub(crate) struct ResourceArena {
    allocator: NodeAllocator,
    slots: Vec<Option<Resource>>,
}

impl ResourceArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            allocator: NodeAllocator::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, resource: Resource) -> NodeId {
        let id = self.allocator.allocate();
        let idx = id.index() as usize;
        if idx == self.slots.len() {
            self.slots.push(Some(resource));
        } else {
            self.slots[idx] = Some(resource);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Resource> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.slots.get(id.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Resource> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    /// Take the payload out and recycle its slot.
    pub fn remove(&mut self, id: NodeId) -> Option<Resource> {
        if !self.allocator.deallocate(id) {
            return None;
        }
        self.slots.get_mut(id.index() as usize)?.take()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.allocator.is_alive(id)
    }

    pub fn len(&self) -> usize {
        self.allocator.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Buffer, BufferDescriptor, BufferUsage};

    fn buffer(size: u64) -> Resource {
        Buffer::new(BufferDescriptor::new(size, BufferUsage::VERTEX)).into()
    }

    #[test]
    fn insert_get_remove() {
        let mut arena = ResourceArena::default();
        let id = arena.insert(buffer(64));
        assert!(arena.contains(id));
        assert_eq!(arena.len(), 1);
        assert!(matches!(arena.get(id), Some(Resource::Buffer(b)) if b.size() == 64));

        assert!(arena.remove(id).is_some());
        assert!(arena.remove(id).is_none());
        assert!(arena.get(id).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn stale_id_does_not_alias_reused_slot() {
        let mut arena = ResourceArena::default();
        let old = arena.insert(buffer(16));
        arena.remove(old);
        let new = arena.insert(buffer(32));

        assert_eq!(old.index(), new.index());
        assert!(arena.get(old).is_none());
        assert!(arena.get_mut(old).is_none());
        assert!(arena.get(new).is_some());
    }
}
