//! Pure data and pure rules: no I/O, no mutable world state.

pub mod catalog;
pub mod direction;
pub mod entity;
pub mod physics;
pub mod rules;
pub mod stage;
pub mod tile;
pub mod topology;
pub mod validate;
