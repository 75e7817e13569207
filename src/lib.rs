//! facepack - ordered registry of character face images
//!
//! Packs hold groups (characters) that hold items (face images). Both
//! levels sort lazily by numeric priority, can be arranged by `after` and
//! `before` links through a cycle-tolerant constraint sorter, and whole
//! packs can be merged by id.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Collection, ConstraintSorter, Group, Item, Merger, ModelError, Priority};
