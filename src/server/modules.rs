use std::{
    collections::HashMap,
    num::NonZeroUsize,
    path::{Component, Path},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Result;
use lru::LruCache;
use serde::Serialize;

use crate::tagger::Tagger;

/// A tagged module as served to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct ServedModule {
    code: String,
    #[fieldwork(get(copy))]
    generation: u64,
}

/// Tagged-module cache plus a per-module reload generation.
///
/// Reloading a module drops its cached transform and bumps its generation;
/// clients poll the generation to know when to refetch.
pub struct ModuleGraph {
    cache: Mutex<LruCache<String, Arc<ServedModule>>>,
    generations: Mutex<HashMap<String, u64>>,
}

impl ModuleGraph {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            generations: Mutex::new(HashMap::new()),
        }
    }

    pub fn generation(&self, relative_path: &str) -> u64 {
        let generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        generations.get(relative_path).copied().unwrap_or_default()
    }

    /// Drop the cached transform for one module and bump its generation
    pub fn reload(&self, relative_path: &str) -> u64 {
        // both locks are held so `insert` never sees the pop without the bump
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.pop(relative_path);

        let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = generations.entry(relative_path.to_string()).or_default();
        *generation += 1;
        log::info!("[inline-edit] reloaded {relative_path} (generation {generation})");
        *generation
    }

    /// Tagged source for a module, from cache when possible
    pub fn load(&self, relative_path: &str, absolute_path: &Path, tagger: &Tagger) -> Result<Arc<ServedModule>> {
        if let Some(module) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(relative_path)
        {
            return Ok(Arc::clone(module));
        }

        let generation = self.generation(relative_path);
        let source = std::fs::read_to_string(absolute_path)?;
        let code = tagger
            .transform(&source, absolute_path)
            .map_or(source, |output| output.into_code());

        Ok(self.insert(relative_path, ServedModule { code, generation }))
    }

    /// Cache a freshly read module unless it was reloaded since the read
    fn insert(&self, relative_path: &str, module: ServedModule) -> Arc<ServedModule> {
        let module = Arc::new(module);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation(relative_path) == module.generation {
            cache.put(relative_path.to_string(), Arc::clone(&module));
        } else {
            log::debug!("[inline-edit] {relative_path} changed while loading, not cached");
        }
        module
    }
}

/// Cache key for a project-relative path: normal components joined with `/`
pub fn module_key(relative_path: &Path) -> String {
    relative_path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl std::fmt::Debug for ModuleGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.cache.lock().map(|cache| cache.len()).unwrap_or_default();
        f.debug_struct("ModuleGraph").field("cached", &cached).finish()
    }
}
