/*!
 * Object Registry
 *
 * Per-type table of every live kernel object. Slots are recycled after
 * deletion with a bumped generation so stale handles miss; a separate
 * creation-ordered list backs the handle enumeration calls.
 */

use crate::core::id::Handle;

struct Slot<T> {
    generation: u32,
    object: Option<T>,
}

/// Live objects of one type
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    created: Vec<Handle<T>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            created: Vec::new(),
        }
    }

    /// Register a fully built object and return its handle
    pub fn insert(&mut self, object: T) -> Handle<T> {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                Handle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                Handle::new(index, 0)
            }
        };
        self.created.push(handle);
        handle
    }

    /// Deregister an object; its handle is dead from here on
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.created.retain(|h| *h != handle);
        Some(object)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.object.as_mut())
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Up to `max` live handles, oldest first
    pub fn handles(&self, max: usize) -> Vec<Handle<T>> {
        self.created.iter().take(max).copied().collect()
    }

    /// Live objects with their handles, oldest first
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.created
            .iter()
            .filter_map(move |handle| self.get(*handle).map(|object| (*handle, object)))
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
