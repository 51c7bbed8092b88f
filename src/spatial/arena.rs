//! Element arena
//!
//! Every live element is stored here; chunk slots and rigid blocks refer to
//! elements by `ElementKey`. Keys are generational: once an element is removed
//! its key never resolves again, even after the slot is reused.

use serde::{Deserialize, Serialize};

use crate::domain::Element;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementKey {
    index: u32,
    generation: u32,
}

impl ElementKey {
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    value: Option<Element>,
}

#[derive(Debug, Default)]
pub struct ElementArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ElementArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) -> ElementKey {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(element);
            return ElementKey { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, value: Some(element) });
        ElementKey { index, generation: 0 }
    }

    pub fn remove(&mut self, key: ElementKey) -> Option<Element> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation || slot.value.is_none() {
            return None;
        }
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        value
    }

    #[inline]
    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.slots
            .get(key.index as usize)
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.value.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.slots
            .get_mut(key.index as usize)
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.value.as_mut())
    }

    #[inline]
    pub fn contains(&self, key: ElementKey) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &Element)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|e| {
                (ElementKey { index: i as u32, generation: s.generation }, e)
            })
        })
    }

    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i as u32);
            }
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellPos, Rgba};
    use crate::domain::{ElementKind, ElementProps, Element};

    fn sand() -> Element {
        let props = ElementProps::builtin(ElementKind::Sand);
        Element::with_color(ElementKind::Sand, CellPos::default(), &props, Default::default(), Rgba::WHITE)
    }

    #[test]
    fn stale_keys_do_not_alias_reused_slots() {
        let mut arena = ElementArena::new();
        let first = arena.insert(sand());
        assert!(arena.remove(first).is_some());

        let second = arena.insert(sand());
        assert_eq!(first.index(), second.index());
        assert!(arena.get(first).is_none());
        assert!(arena.get(second).is_some());
        assert!(arena.remove(first).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn clear_invalidates_every_key() {
        let mut arena = ElementArena::new();
        let keys: Vec<_> = (0..4).map(|_| arena.insert(sand())).collect();
        arena.clear();
        assert!(arena.is_empty());
        assert!(keys.iter().all(|k| !arena.contains(*k)));
        assert_eq!(arena.iter().count(), 0);
    }
}
