//! Shared test utilities for mesh crates
//!
//! This crate provides:
//! - **Fixtures**: ready-made lineage graphs (chain, cycle, diamond, fan-out)
//! - **Builders**: a fluent builder for arbitrary graphs on a [`mesh_lineage::LineageService`]
//! - **Assertions**: helpers that compare traversal results by id and depth
//!
//! # Example
//!
//! ```ignore
//! use mesh_tests::{assertions, fixtures};
//!
//! #[test]
//! fn test_cycle() {
//!     let service = fixtures::cycle();
//!     let downstream = service.get_downstream("A", None).unwrap();
//!     assertions::assert_reached(&downstream, &[("B", 1), ("C", 2)]);
//! }
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use builders::GraphBuilder;
