//! Union merge of packs from independent sources
//!
//! A [`Merger`] starts from a deep copy of a base container and folds other
//! containers into it by id. Groups are matched by id and created on first
//! sight; items are always inserted through [`Group::add`], so the same
//! `group/item` pair coming from two sources fails with `DuplicateId`
//! instead of one entry silently winning. No source is mutated.

use thiserror::Error;

use super::collection::Collection;
use super::error::ModelError;
use super::group::Group;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Merge result was already taken")]
    AlreadyFinished,

    #[error("Merge was aborted by an earlier failure")]
    Aborted,
}

/// Containers that can be folded into each other
pub trait Mergeable: Sized {
    /// Detached deep copy
    fn deep_copy(&self) -> Self;

    /// Deep-copies every child of `other` into `self`
    fn merge_from(&mut self, other: &Self) -> Result<(), ModelError>;
}

impl Mergeable for Group {
    fn deep_copy(&self) -> Self {
        self.copy()
    }

    fn merge_from(&mut self, other: &Self) -> Result<(), ModelError> {
        for item in other.in_arrival_order() {
            self.add(item.copy())?;
        }
        Ok(())
    }
}

impl Mergeable for Collection {
    fn deep_copy(&self) -> Self {
        self.copy()
    }

    fn merge_from(&mut self, other: &Self) -> Result<(), ModelError> {
        for source in other.in_arrival_order() {
            if !self.contains(source.id()) {
                self.add(source.copy_shell().with_step(self.step()))?;
            }
            self.group_mut(source.id())?.merge_from(source)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
enum State<T> {
    Open(T),
    Finished,
    Aborted,
}

/// One-shot builder producing the union of several containers
#[derive(Debug)]
pub struct Merger<T> {
    state: State<T>,
    sources: usize,
}

impl<T: Mergeable> Merger<T> {
    /// Starts a merge from a deep copy of `base`
    pub fn new(base: &T) -> Self {
        Self {
            state: State::Open(base.deep_copy()),
            sources: 1,
        }
    }

    /// Folds `other` into the working copy
    ///
    /// Any failure aborts the whole merge: the working copy is dropped and
    /// every later call fails with [`MergeError::Aborted`].
    pub fn add(&mut self, other: &T) -> Result<&mut Self, MergeError> {
        let result = match &mut self.state {
            State::Open(working) => working.merge_from(other),
            State::Finished => return Err(MergeError::AlreadyFinished),
            State::Aborted => return Err(MergeError::Aborted),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, source = self.sources, "merge aborted");
            self.state = State::Aborted;
            return Err(e.into());
        }

        self.sources += 1;
        tracing::debug!(sources = self.sources, "merged source");
        Ok(self)
    }

    /// Returns the number of sources folded in so far, base included
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// Takes the result; only the first call succeeds
    pub fn finish(&mut self) -> Result<T, MergeError> {
        match std::mem::replace(&mut self.state, State::Finished) {
            State::Open(result) => Ok(result),
            State::Finished => Err(MergeError::AlreadyFinished),
            State::Aborted => {
                self.state = State::Aborted;
                Err(MergeError::Aborted)
            }
        }
    }
}

/// Merges `base` with every container in `others`
pub fn merge_all<'a, T: Mergeable + 'a>(
    base: &T,
    others: impl IntoIterator<Item = &'a T>,
) -> Result<T, MergeError> {
    let mut merger = Merger::new(base);
    for other in others {
        merger.add(other)?;
    }
    merger.finish()
}
