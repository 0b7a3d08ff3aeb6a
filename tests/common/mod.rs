//! Common test utilities for socialgraph scenario tests
//!
//! This module provides shared helpers for building populated graphs
//! and reference metrics to check the engine against.

#![allow(dead_code, unused_imports)]

pub mod graph_builder;
pub mod metrics;

pub use graph_builder::{random_graph, GraphBuilder, RandomGraphConfig};
pub use metrics::{component_sizes, reference_components};
