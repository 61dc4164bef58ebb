//! Append-only storage with typed handles.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

/// A typed index into an [`Arena`].
///
/// Handles serialize as their bare index.
pub struct Handle<T> {
    index: u32,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index)
    }
}

impl<T> Handle<T> {
    fn new(index: u32) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Vector-backed arena; values are never removed, so handles stay valid.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Arena<T> {
    data: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a value and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX` values.
    pub fn append(&mut self, value: T) -> Handle<T> {
        let index = u32::try_from(self.data.len()).unwrap_or_else(|_| {
            panic!("arena overflow: {} items exceeds u32::MAX", self.data.len())
        });
        self.data.push(value);
        Handle::new(index)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.data.get(handle.index())
    }

    pub(crate) fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.data.get_mut(handle.index())
    }

    /// `(handle, &value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (Handle::new(i as u32), v))
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        &self.data[handle.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_index() {
        let mut arena = Arena::new();
        let a = arena.append("a");
        let b = arena.append("b");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_ne!(a, b);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn test_iter_order() {
        let mut arena = Arena::new();
        arena.append(10);
        arena.append(20);
        let values: Vec<(usize, i32)> = arena.iter().map(|(h, v)| (h.index(), *v)).collect();
        assert_eq!(values, vec![(0, 10), (1, 20)]);
    }

    #[test]
    fn test_handle_serializes_as_index() {
        let mut arena = Arena::new();
        arena.append(1.5);
        let h = arena.append(2.5);
        assert_eq!(serde_json::to_string(&h).unwrap(), "1");
        assert_eq!(serde_json::to_string(&arena).unwrap(), "[1.5,2.5]");
    }
}
