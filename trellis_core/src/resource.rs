// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name-keyed cache of shared host resources.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

/// A resource that can be produced from load arguments.
pub trait Load: Sized {
    /// What the loader needs, typically a path.
    type Args;
    /// Why a load failed.
    type Error: fmt::Display;

    /// Produces the resource.
    fn load(args: Self::Args) -> Result<Self, Self::Error>;
}

/// Maps names to reference-counted resources.
pub struct ResourceCache<R> {
    entries: BTreeMap<String, Rc<R>>,
}

/// A cache shared between the code that loads resources and the components
/// that draw them.
pub type SharedCache<R> = Rc<RefCell<ResourceCache<R>>>;

impl<R> Default for ResourceCache<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R> fmt::Debug for ResourceCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<R> ResourceCache<R> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache ready to be shared.
    #[must_use]
    pub fn shared() -> SharedCache<R> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Returns the resource stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<R>> {
        self.entries.get(name).cloned()
    }

    /// Stores `resource` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, resource: R) -> Rc<R> {
        let rc = Rc::new(resource);
        self.entries.insert(name.into(), Rc::clone(&rc));
        rc
    }

    /// Removes and returns the entry for `name`.
    pub fn remove(&mut self, name: &str) -> Option<Rc<R>> {
        self.entries.remove(name)
    }

    /// Returns every stored name in ascending order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Load> ResourceCache<R> {
    /// Loads a resource and stores it under `name`.
    ///
    /// A successful load replaces any existing entry. A failed load is logged
    /// and leaves the cache untouched.
    pub fn load(&mut self, name: &str, args: R::Args) -> Option<Rc<R>> {
        match R::load(args) {
            Ok(resource) => Some(self.insert(name, resource)),
            Err(err) => {
                log::warn!("failed to load resource '{name}': {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Blob(u32);

    impl Load for Blob {
        type Args = i64;
        type Error = &'static str;

        fn load(args: i64) -> Result<Self, Self::Error> {
            u32::try_from(args).map(Blob).map_err(|_| "negative size")
        }
    }

    #[test]
    fn load_then_get_shares_one_instance() {
        let mut cache = ResourceCache::<Blob>::new();
        let loaded = cache.load("a", 4);
        let fetched = cache.get("a");
        assert!(
            loaded.zip(fetched).is_some_and(|(l, f)| Rc::ptr_eq(&l, &f)),
            "get returns the loaded instance"
        );
    }

    #[test]
    fn failed_load_keeps_previous_entry() {
        let mut cache = ResourceCache::<Blob>::new();
        cache.load("a", 1);
        assert!(cache.load("a", -1).is_none(), "negative args fail");
        assert_eq!(cache.get("a").as_deref(), Some(&Blob(1)));
    }

    #[test]
    fn reload_overwrites() {
        let mut cache = ResourceCache::<Blob>::new();
        cache.load("a", 1);
        cache.load("a", 2);
        assert_eq!(cache.get("a").as_deref(), Some(&Blob(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let mut cache = ResourceCache::<Blob>::new();
        cache.insert("b", Blob(0));
        cache.insert("a", Blob(0));
        assert_eq!(cache.names(), ["a", "b"]);
        assert!(cache.get("missing").is_none(), "unknown name");
    }
}
