//! Roomies grid core: stage model, wrap-around topology, validation and the
//! frame-stepped push simulation.

pub mod config;
pub mod domain;
pub mod sim;
