//! # Raft Node Test cases
//!
//! End-to-end scenarios for in-process clusters. Every case is a `run()` function
//! wrapped by a `#[test]`; the `cases` binary runs all of them in sequence.

#[macro_use]
extern crate log;

mod steps;

pub use steps::init_logger;
