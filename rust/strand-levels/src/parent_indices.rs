use std::sync::Arc;

use strand_common::{Result, error::Error};

use crate::repetition::{RepetitionPattern, RepetitionType};

/// Converts a leaf column's (definition level, repetition level) pairs into
/// one parent-index list per step of its repetition pattern.
///
/// `parent_indices()[i][k]` is the position, among the nodes of step `i - 1`,
/// of the parent of the `k`-th node of step `i`. Nodes of the root step all
/// have parent 0. For the pattern `[repeated, repeated, optional]` the pairs
/// `(2, 0), (2, 1)` describe one record holding a list of two present
/// optional values:
///
/// ```
/// use strand_levels::{ParentIndicesBuilder, RepetitionPattern, RepetitionType::*};
///
/// let pattern = RepetitionPattern::new([Repeated, Repeated, Optional]).unwrap();
/// let mut builder = ParentIndicesBuilder::new(pattern);
/// builder.add(2, 0).unwrap();
/// builder.add(2, 1).unwrap();
/// assert_eq!(builder.parent_indices(), &[vec![0], vec![0, 0], vec![0, 1]]);
/// ```
///
/// The pattern is shared, so builders for many batches or threads can be
/// made from one pattern; each builder owns its lists.
#[derive(Debug, Clone)]
pub struct ParentIndicesBuilder {
    pattern: Arc<RepetitionPattern>,
    parent_indices: Vec<Vec<i64>>,
}

impl ParentIndicesBuilder {
    pub fn new(pattern: impl Into<Arc<RepetitionPattern>>) -> ParentIndicesBuilder {
        let pattern = pattern.into();
        let parent_indices = vec![Vec::new(); pattern.len()];
        ParentIndicesBuilder {
            pattern,
            parent_indices,
        }
    }

    pub fn pattern(&self) -> &Arc<RepetitionPattern> {
        &self.pattern
    }

    /// Appends the parents introduced by one leaf entry.
    ///
    /// Steps are visited from the root. A step deeper than the definition
    /// level ends the walk (the entry is null there). While the repetition
    /// level is positive, each repeated step consumes one level without
    /// appending, since the entry continues a list opened by an earlier
    /// entry. From the step where the entry diverges onwards, a parent is
    /// appended at every step, except at an optional step whose last parent
    /// already is the current parent node.
    ///
    /// # Errors
    ///
    /// `Corrupt` if the levels refer to a parent that was never opened, as
    /// happens when a column starts with a non-zero repetition level.
    pub fn add(&mut self, definition_level: i16, repetition_level: i16) -> Result<()> {
        let max_definition_level = self.pattern.max_definition_level();
        let max_repetition_level = self.pattern.max_repetition_level();
        let mut unwind = repetition_level;
        let mut non_required = 0i16;

        for (i, &step) in self.pattern.steps().iter().enumerate() {
            if step != RepetitionType::Required {
                non_required += 1;
            }
            // With only required steps below the root there are no nulls and
            // the definition level carries no information.
            if max_definition_level > 0
                && definition_level < max_definition_level
                && non_required > definition_level + 1
            {
                break;
            }

            if max_repetition_level > 0 && unwind > 0 {
                if step == RepetitionType::Repeated {
                    unwind -= 1;
                }
                continue;
            }

            if i == 0 {
                self.parent_indices[0].push(0);
                continue;
            }

            let (parents, rest) = self.parent_indices.split_at_mut(i);
            let Some(parent) = parents[i - 1].len().checked_sub(1) else {
                return Err(Error::corrupt(
                    "levels",
                    format!(
                        "entry ({definition_level}, {repetition_level}) has no parent at step {}",
                        i - 1
                    ),
                ));
            };
            let parent = parent as i64;
            let current = &mut rest[0];
            if step != RepetitionType::Optional || current.last() != Some(&parent) {
                current.push(parent);
            }
        }
        Ok(())
    }

    /// Adds entries from parallel level slices.
    pub fn add_levels(&mut self, definition_levels: &[i16], repetition_levels: &[i16]) -> Result<()> {
        if definition_levels.len() != repetition_levels.len() {
            return Err(Error::internal(format!(
                "{} definition levels but {} repetition levels",
                definition_levels.len(),
                repetition_levels.len()
            )));
        }
        for (&def, &rep) in definition_levels.iter().zip(repetition_levels) {
            self.add(def, rep)?;
        }
        Ok(())
    }

    pub fn parent_indices(&self) -> &[Vec<i64>] {
        &self.parent_indices
    }

    /// Clears every step's list, keeping the allocations.
    pub fn reset(&mut self) {
        self.parent_indices.iter_mut().for_each(Vec::clear);
    }

    /// Hands out the lists accumulated so far and starts over.
    pub fn take(&mut self) -> Vec<Vec<i64>> {
        let empty = vec![Vec::new(); self.pattern.len()];
        std::mem::replace(&mut self.parent_indices, empty)
    }
}
