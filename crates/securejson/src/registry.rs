//! Named instance registry: late-bound lookup of configured components.
//!
//! Code paths that were not handed a [`CipherEngine`] (or any other shared
//! component) can resolve one by name. The registry is an explicit value
//! created at the process boundary and cloned into whoever needs it; there is
//! no global static behind it.
//!
//! Reads are lock-free via [`ArcSwap`]; writes copy the map and swap it in
//! atomically, so concurrent `register` calls never lose an entry.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info};

use crate::crypto::CipherEngine;

/// Name under which the process-wide [`CipherEngine`] is registered.
pub const CIPHER_ENGINE: &str = "securejson.cipher";

type Instance = Arc<dyn Any + Send + Sync>;

/// Shared, thread-safe map from logical name to component instance.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<ArcSwap<HashMap<String, Instance>>>,
}

impl Registry {
    /// Create a new, empty [`Registry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `instance` to `name`, replacing any previous binding.
    ///
    /// Returns `true` if an earlier instance was replaced.
    pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, instance: T) -> bool {
        let name = name.into();
        let instance: Instance = Arc::new(instance);
        let previous = self.inner.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(name.clone(), Arc::clone(&instance));
            next
        });
        let replaced = previous.contains_key(&name);
        if replaced {
            info!(name = %name, "registry entry replaced");
        } else {
            debug!(name = %name, "registry entry added");
        }
        replaced
    }

    /// Look up the instance bound to `name`.
    ///
    /// Returns `None` if nothing is registered under `name` or the instance
    /// is not a `T`. This is a lock-free read.
    pub fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let entry = self.inner.load().get(name).cloned()?;
        entry.downcast::<T>().ok()
    }

    /// Remove the binding for `name`. Returns `true` if one existed.
    pub fn unregister(&self, name: &str) -> bool {
        let previous = self.inner.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(name);
            next
        });
        previous.contains_key(name)
    }

    /// Return the number of registered instances.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Resolve the engine registered under [`CIPHER_ENGINE`].
    pub fn cipher_engine(&self) -> Option<Arc<CipherEngine>> {
        self.resolve(CIPHER_ENGINE)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.load();
        let mut names: Vec<&String> = guard.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyMaterial, KEY_LEN};

    #[test]
    fn initially_empty() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.resolve::<String>("missing").is_none());
        assert!(registry.cipher_engine().is_none());
    }

    #[test]
    fn register_and_resolve() {
        let registry = Registry::new();
        assert!(!registry.register("greeting", String::from("hello")));
        let got = registry.resolve::<String>("greeting").unwrap();
        assert_eq!(got.as_str(), "hello");
    }

    #[test]
    fn wrong_type_resolves_to_none() {
        let registry = Registry::new();
        registry.register("n", 5u32);
        assert!(registry.resolve::<String>("n").is_none());
        assert_eq!(registry.resolve::<u32>("n").as_deref(), Some(&5));
    }

    #[test]
    fn re_register_replaces() {
        let registry = Registry::new();
        registry.register("n", 1u32);
        assert!(registry.register("n", 2u32));
        assert_eq!(registry.resolve::<u32>("n").as_deref(), Some(&2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes() {
        let registry = Registry::new();
        registry.register("n", 1u32);
        assert!(registry.unregister("n"));
        assert!(!registry.unregister("n"));
        assert!(registry.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let registry = Registry::new();
        let other = registry.clone();
        let engine = CipherEngine::new(KeyMaterial::from_raw_key(&[1u8; KEY_LEN]).unwrap());
        registry.register(CIPHER_ENGINE, engine);
        assert!(other.cipher_engine().is_some());
    }

    #[test]
    fn concurrent_registration_keeps_every_entry() {
        let registry = Registry::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.register(format!("component-{i}"), i);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
        for i in 0..8 {
            assert_eq!(registry.resolve::<i32>(&format!("component-{i}")).as_deref(), Some(&i));
        }
    }
}
