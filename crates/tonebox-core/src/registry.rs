//! Slot arena for live voices.
//!
//! Voices are stored by value in generation-tagged slots and addressed by a
//! [`VoiceId`] handle. Freed slots are reused, but a handle to a removed voice
//! never resolves to the voice that later occupies its slot. Iteration follows
//! insertion order, independent of which slot a voice landed in.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::fmt;

use crate::voice::Voice;

/// Handle to a voice in a [`VoiceRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoiceId {
    index: u32,
    generation: u32,
}

impl VoiceId {
    /// Slot index (reused after removal).
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoiceId({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    voice: Option<Voice>,
}

/// Insertion-ordered collection of voices addressed by stable handles.
#[derive(Debug, Clone, Default)]
pub struct VoiceRegistry {
    slots: Vec<Slot>,
    /// Live handles in insertion order.
    order: Vec<VoiceId>,
    /// Vacant slot indices.
    free: Vec<u32>,
}

impl VoiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with room for `capacity` voices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of live voices.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no voices are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add a voice at the end of the iteration order and return its handle.
    pub fn insert(&mut self, voice: Voice) -> VoiceId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.voice = Some(voice);
                VoiceId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    voice: Some(voice),
                });
                VoiceId {
                    index,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        id
    }

    /// Remove a voice, freeing its slot. Returns `None` for stale handles.
    pub fn remove(&mut self, id: VoiceId) -> Option<Voice> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let voice = slot.voice.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|&live| live != id);
        Some(voice)
    }

    /// True if `id` refers to a live voice.
    pub fn contains(&self, id: VoiceId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a voice.
    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.voice.as_ref())
    }

    /// Look up a voice mutably.
    pub fn get_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.voice.as_mut())
    }

    /// Live handles in insertion order.
    pub fn ids(&self) -> &[VoiceId] {
        &self.order
    }

    /// Iterate live voices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VoiceId, &Voice)> + '_ {
        self.order.iter().filter_map(move |&id| {
            self.slots[id.index as usize]
                .voice
                .as_ref()
                .map(|voice| (id, voice))
        })
    }

    /// Visit every live voice mutably, in insertion order.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(VoiceId, &mut Voice),
    {
        for &id in &self.order {
            if let Some(voice) = self.slots[id.index as usize].voice.as_mut() {
                f(id, voice);
            }
        }
    }

    /// Remove every voice.
    pub fn clear(&mut self) {
        for &id in &self.order {
            let slot = &mut self.slots[id.index as usize];
            slot.voice = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        self.order.clear();
    }
}
