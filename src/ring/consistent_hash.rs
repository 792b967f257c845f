use std::collections::HashMap;

/// Hash used to place peers and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual node positions.
    keys: Vec<u32>,
    hash_map: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring. `hash` defaults to CRC-32 (IEEE).
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            keys: Vec::new(),
            hash_map: HashMap::new(),
        }
    }

    /// Places `replicas` virtual nodes for every peer.
    ///
    /// Adding a peer that is already on the ring places it a second time.
    /// Callers that change membership should build a fresh ring instead.
    pub fn add<S: AsRef<str>>(&mut self, peers: &[S]) {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.keys.push(hash);
                self.hash_map.insert(hash, peer.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the peer owning `key`: the first virtual node at or after the
    /// key's hash, wrapping around to the start of the ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);
        let position = self.keys[idx % self.keys.len()];

        self.hash_map.get(&position).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}
