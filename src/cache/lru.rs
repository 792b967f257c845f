//! Byte-bounded LRU store.
//!
//! Entries live in a slot arena and are linked by slot index, most recently
//! used at the head. A `HashMap` maps keys to slots.
//!
//! ```text
//!   head ─► [slot 3] ◄──► [slot 0] ◄──► [slot 5] ◄── tail (evicted first)
//! ```
//!
//! The store is not synchronized; [`super::store::Cache`] puts it behind a
//! mutex.

use std::collections::HashMap;

use super::byteview::ByteView;

/// Callback invoked with every entry evicted for exceeding the byte budget.
pub type OnEvicted = Box<dyn FnMut(String, ByteView) + Send>;

#[derive(Debug)]
struct Entry {
    key: String,
    value: ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct Lru {
    max_bytes: usize,
    n_bytes: usize,
    slots: Vec<Option<Entry>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<OnEvicted>,
}

impl Lru {
    /// Creates a store holding at most `max_bytes` of keys plus values.
    /// A budget of `0` disables eviction.
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted>) -> Self {
        Self {
            max_bytes,
            n_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted,
        }
    }

    /// Looks up `key` and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&ByteView> {
        let id = *self.index.get(key)?;
        self.move_to_front(id);
        self.slots[id].as_ref().map(|entry| &entry.value)
    }

    /// Inserts or updates `key`, then evicts from the tail until the store
    /// fits its budget again.
    pub fn add(&mut self, key: &str, value: ByteView) {
        let value_len = value.len();

        if let Some(&id) = self.index.get(key) {
            self.move_to_front(id);
            if let Some(entry) = self.slots[id].as_mut() {
                self.n_bytes = self.n_bytes - entry.value.len() + value_len;
                entry.value = value;
            }
        } else {
            let id = self.alloc(Entry {
                key: key.to_string(),
                value,
                prev: None,
                next: None,
            });
            self.attach_front(id);
            self.index.insert(key.to_string(), id);
            self.n_bytes += key.len() + value_len;
        }

        while self.max_bytes != 0 && self.n_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    /// Evicts the least recently used entry. Returns `false` if the store
    /// was already empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(id) = self.tail else {
            return false;
        };
        self.detach(id);

        let Some(entry) = self.slots[id].take() else {
            return false;
        };
        self.free.push(id);
        self.index.remove(&entry.key);
        self.n_bytes -= entry.key.len() + entry.value.len();

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(entry.key, entry.value);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently held, counting both keys and values.
    pub fn bytes(&self) -> usize {
        self.n_bytes
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            lru: self,
            current: self.head,
        }
    }

    fn alloc(&mut self, entry: Entry) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(entry);
                id
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn move_to_front(&mut self, id: usize) {
        if self.head == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_front(id);
    }

    fn detach(&mut self, id: usize) {
        let (prev, next) = match self.slots[id].as_ref() {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(entry) = self.slots[p].as_mut() {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.slots[n].as_mut() {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(entry) = self.slots[id].as_mut() {
            entry.prev = None;
            entry.next = None;
        }
    }

    fn attach_front(&mut self, id: usize) {
        let old_head = self.head;
        if let Some(entry) = self.slots[id].as_mut() {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(entry) = self.slots[h].as_mut() {
                    entry.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Walks the list in both directions and recomputes the byte count.
    #[cfg(test)]
    pub(crate) fn validate_invariants(&self) {
        let forward: Vec<usize> = {
            let mut ids = Vec::new();
            let mut cur = self.head;
            while let Some(id) = cur {
                ids.push(id);
                cur = self.slots[id].as_ref().and_then(|e| e.next);
            }
            ids
        };
        let mut backward: Vec<usize> = {
            let mut ids = Vec::new();
            let mut cur = self.tail;
            while let Some(id) = cur {
                ids.push(id);
                cur = self.slots[id].as_ref().and_then(|e| e.prev);
            }
            ids
        };
        backward.reverse();

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), self.index.len());

        let counted: usize = forward
            .iter()
            .filter_map(|&id| self.slots[id].as_ref())
            .map(|e| e.key.len() + e.value.len())
            .sum();
        assert_eq!(counted, self.n_bytes);

        if self.max_bytes != 0 {
            assert!(self.n_bytes <= self.max_bytes);
        }
    }
}

impl std::fmt::Debug for Lru {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lru")
            .field("max_bytes", &self.max_bytes)
            .field("n_bytes", &self.n_bytes)
            .field("len", &self.index.len())
            .finish()
    }
}

pub struct Keys<'a> {
    lru: &'a Lru,
    current: Option<usize>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.lru.slots[self.current?].as_ref()?;
        self.current = entry.next;
        Some(entry.key.as_str())
    }
}
