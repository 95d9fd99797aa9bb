//! Mutable simulation state, the per-tick step, and stage storage.

pub mod authoring;
pub mod event;
pub mod input;
pub mod pool;
pub mod step;
pub mod store;
pub mod world;
