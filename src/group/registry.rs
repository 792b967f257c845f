//! Group Registry
//!
//! Maps group names to their `Group`. The registry is an ordinary value owned
//! by the application and shared by reference with whoever needs lookups
//! (the peer protocol server included), so independent registries can live
//! side by side in one process.

use dashmap::DashMap;
use std::sync::Arc;

use super::getter::Getter;
use super::group::Group;
use crate::error::CacheError;

pub struct Registry {
    groups: DashMap<String, Arc<Group>>,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a group and registers it under `name`.
    ///
    /// An existing group with the same name is replaced.
    pub fn new_group(&self, name: &str, cache_bytes: usize, getter: Getter) -> Arc<Group> {
        let group = Arc::new(Group::new(name, cache_bytes, getter));

        if self.groups.insert(name.to_string(), group.clone()).is_some() {
            tracing::warn!("Replaced existing group: {}", name);
        } else {
            tracing::info!("Registered group {} ({} cache bytes)", name, cache_bytes);
        }

        group
    }

    /// Starts building a group whose getter may not be known up front.
    pub fn group_builder(&self, name: &str) -> GroupBuilder<'_> {
        GroupBuilder {
            registry: self,
            name: name.to_string(),
            cache_bytes: 0,
            getter: None,
        }
    }

    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.get(name).map(|entry| entry.value().clone())
    }

    /// Returns a list of all registered group names.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            groups: DashMap::new(),
        }
    }
}

/// Builder returned by [`Registry::group_builder`].
pub struct GroupBuilder<'a> {
    registry: &'a Registry,
    name: String,
    cache_bytes: usize,
    getter: Option<Getter>,
}

impl GroupBuilder<'_> {
    /// Byte budget for the group's cache. `0` means unbounded.
    pub fn cache_bytes(mut self, cache_bytes: usize) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn getter(mut self, getter: Getter) -> Self {
        self.getter = Some(getter);
        self
    }

    /// Registers the group. Fails with [`CacheError::MissingGetter`] when no
    /// getter was supplied: a group must always have a path to its data.
    pub fn build(self) -> Result<Arc<Group>, CacheError> {
        let getter = self.getter.ok_or(CacheError::MissingGetter)?;
        Ok(self.registry.new_group(&self.name, self.cache_bytes, getter))
    }
}
