//! Domain models for facepack
//!
//! Contains the ownership model and ordering engines without any I/O concerns.

mod collection;
mod constraint;
mod error;
mod group;
mod item;
mod merge;
mod priority;

pub use collection::{Collection, PATH_DELIMITER};
pub use constraint::{
    Arrangement, ConstraintSorter, Diagnostics, Links, SortReport, SortScratch,
};
pub use error::ModelError;
pub use group::Group;
pub use item::{Item, Meta};
pub use merge::{merge_all, MergeError, Mergeable, Merger};
pub use priority::{next_spaced, Priority, DEFAULT_PRIORITY_STEP};
