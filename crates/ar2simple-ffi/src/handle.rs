//! Generation-checked handle table for objects owned across the C ABI.
//!
//! A handle packs a slot index (high 32 bits) and that slot's generation
//! (low 32 bits). Removing a value bumps the generation, so a stale handle
//! can never reach a newer occupant. A slot whose generation would wrap is
//! retired instead of reused.

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
    Retired,
}

pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

fn pack(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

impl<T> HandleTable<T> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> u64 {
        while let Some(slot) = self.vacant.pop() {
            if let Some(entry) = self.entries.get_mut(slot as usize) {
                if let Entry::Vacant { generation } = entry {
                    let generation = *generation;
                    *entry = Entry::Occupied { generation, value };
                    return pack(slot, generation);
                }
            }
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 0,
            value,
        });
        pack(slot, 0)
    }

    pub(crate) fn get(&self, handle: u64) -> Option<&T> {
        let (slot, want) = unpack(handle);
        match self.entries.get(slot)? {
            Entry::Occupied { generation, value } if *generation == want => Some(value),
            _ => None,
        }
    }

    pub(crate) fn remove(&mut self, handle: u64) -> Option<T> {
        let (slot, want) = unpack(handle);
        let entry = self.entries.get_mut(slot)?;
        match entry {
            Entry::Occupied { generation, .. } if *generation == want => {}
            _ => return None,
        }
        let next = match want.checked_add(1) {
            Some(generation) => {
                self.vacant.push(slot as u32);
                Entry::Vacant { generation }
            }
            None => Entry::Retired,
        };
        match std::mem::replace(entry, next) {
            Entry::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Occupied { .. }))
            .count()
    }
}
