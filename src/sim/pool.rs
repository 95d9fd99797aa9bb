//! Instance pool boundary.
//!
//! The simulation asks the host for one presentation instance per tile,
//! prop, character and win effect when a stage loads, and hands them all
//! back when it unloads. `InstancePool` is the bundled implementation: a
//! free list per prefab so reloading a stage reuses released instances.
//! All access goes through methods so a handle is never released twice.

use std::collections::{HashMap, HashSet};

use log::warn;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PrefabKey {
    Tile(i32),
    Prop(i32),
    Character(i32),
    WinEffect,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PoolHandle {
    pub key: PrefabKey,
    pub id: u32,
}

pub trait ObjectPool {
    fn acquire(&mut self, key: PrefabKey) -> PoolHandle;
    fn release(&mut self, handle: PoolHandle);
}

#[derive(Debug, Default)]
pub struct InstancePool {
    free: HashMap<PrefabKey, Vec<u32>>,
    live: HashSet<PoolHandle>,
    next_id: u32,
}

impl InstancePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances currently handed out.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Released instances waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Instances ever created.
    pub fn created_count(&self) -> usize {
        self.next_id as usize
    }

    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.live.contains(&handle)
    }
}

impl ObjectPool for InstancePool {
    fn acquire(&mut self, key: PrefabKey) -> PoolHandle {
        let id = match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        let handle = PoolHandle { key, id };
        self.live.insert(handle);
        handle
    }

    fn release(&mut self, handle: PoolHandle) {
        if !self.live.remove(&handle) {
            warn!("pool: ignoring release of {handle:?}, not live");
            return;
        }
        self.free.entry(handle.key).or_default().push(handle.id);
    }
}
