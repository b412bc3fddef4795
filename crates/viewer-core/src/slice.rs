//! Immutable snapshot of a sparse window over the merged id space.

use crate::ids::UniversalId;

/// Errors raised when a data source hands over a malformed slice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    #[error("slice ids must be strictly ascending (id {current} follows {previous})")]
    NotAscending {
        previous: UniversalId,
        current: UniversalId,
    },
    #[error("slice counts disagree: {skipped_before} + {loaded} + {skipped_after} != {full_count}")]
    CountMismatch {
        skipped_before: usize,
        loaded: usize,
        skipped_after: usize,
        full_count: usize,
    },
}

/// A loaded window of ids plus what is known about the entries around it.
///
/// Ids ascend. "Before" is the older, bottom end of the list and "after" is
/// the newer, top end; `skipped_after == Some(0)` means the newest entry is
/// loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slice {
    ids: Vec<UniversalId>,
    skipped_before: Option<usize>,
    skipped_after: Option<usize>,
    full_count: Option<usize>,
}

impl Slice {
    /// Build a slice, checking ordering and count consistency.
    pub fn new(
        ids: Vec<UniversalId>,
        skipped_before: Option<usize>,
        skipped_after: Option<usize>,
        full_count: Option<usize>,
    ) -> Result<Self, SliceError> {
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(SliceError::NotAscending {
                previous: pair[0],
                current: pair[1],
            });
        }

        if let (Some(before), Some(after), Some(full)) = (skipped_before, skipped_after, full_count)
        {
            if before + ids.len() + after != full {
                return Err(SliceError::CountMismatch {
                    skipped_before: before,
                    loaded: ids.len(),
                    skipped_after: after,
                    full_count: full,
                });
            }
        }

        Ok(Self {
            ids,
            skipped_before,
            skipped_after,
            full_count,
        })
    }

    /// Slice with nothing loaded and nothing known.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[UniversalId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<UniversalId> {
        self.ids.get(index).copied()
    }

    pub fn skipped_before(&self) -> Option<usize> {
        self.skipped_before
    }

    pub fn skipped_after(&self) -> Option<usize> {
        self.skipped_after
    }

    pub fn full_count(&self) -> Option<usize> {
        self.full_count
    }

    /// Newest entry is loaded.
    pub fn top_loaded(&self) -> bool {
        self.skipped_after == Some(0)
    }

    /// Oldest entry is loaded.
    pub fn bottom_loaded(&self) -> bool {
        self.skipped_before == Some(0)
    }

    pub fn index_of(&self, id: UniversalId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    pub fn contains(&self, id: UniversalId) -> bool {
        self.index_of(id).is_some()
    }

    /// Signed distance in slice positions from `from` to `to`.
    ///
    /// Ids are sparse, so this counts loaded entries rather than subtracting
    /// ids. Returns `None` if either id is not loaded.
    pub fn distance(&self, from: UniversalId, to: UniversalId) -> Option<isize> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        Some(to as isize - from as isize)
    }

    /// The loaded id closest to `id` from above, or the newest loaded id when
    /// everything loaded is older than `id`.
    pub fn nearest(&self, id: UniversalId) -> Option<UniversalId> {
        let index = self.ids.partition_point(|&loaded| loaded < id);
        self.ids.get(index).or_else(|| self.ids.last()).copied()
    }

    /// Loaded ids from newest to oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = UniversalId> + '_ {
        self.ids.iter().rev().copied()
    }
}
