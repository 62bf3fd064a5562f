//! Repetition types of the steps on a path from the record root to a leaf.

use std::{fmt, str::FromStr};

use log::warn;
use serde::{Deserialize, Serialize};
use strand_common::{Result, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionType {
    Required,
    Optional,
    Repeated,
}

impl RepetitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepetitionType::Required => "required",
            RepetitionType::Optional => "optional",
            RepetitionType::Repeated => "repeated",
        }
    }
}

impl fmt::Display for RepetitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepetitionType {
    type Err = Error;

    /// Accepts the full names in any case, or the initials `R`, `O` and `P`
    /// (re**p**eated).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "required" | "r" => Ok(RepetitionType::Required),
            "optional" | "o" => Ok(RepetitionType::Optional),
            "repeated" | "p" => Ok(RepetitionType::Repeated),
            _ => Err(Error::invalid_arg(
                "repetition_type",
                format!("unknown repetition type '{s}'"),
            )),
        }
    }
}

/// Repetition types of the steps from the root (index 0) to a leaf column,
/// together with the maximum levels they allow.
///
/// The root step stands for the sequence of records and is always
/// `Repeated`; it is not counted towards the levels, so a path with a
/// repeated root and a single optional leaf has a maximum definition level
/// of 1 and a maximum repetition level of 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionPattern {
    steps: Vec<RepetitionType>,
    max_definition_level: i16,
    max_repetition_level: i16,
}

impl RepetitionPattern {
    /// Creates a pattern from root-first steps.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for an empty pattern, `InvalidArgument` if the root step
    /// is not `Repeated` or the path is too deep for 16-bit levels.
    pub fn new(steps: impl Into<Vec<RepetitionType>>) -> Result<RepetitionPattern> {
        let steps = steps.into();
        let Some(&root) = steps.first() else {
            return Err(Error::out_of_range(
                "repetition_pattern",
                "a repetition pattern needs at least the root step",
            ));
        };
        if root != RepetitionType::Repeated {
            return Err(Error::invalid_arg(
                "repetition_pattern",
                format!("the root step must be repeated, got {root}"),
            ));
        }
        if steps.len() > i16::MAX as usize {
            return Err(Error::invalid_arg(
                "repetition_pattern",
                format!("{} steps exceed the maximum level", steps.len()),
            ));
        }

        let non_required = steps
            .iter()
            .filter(|&&t| t != RepetitionType::Required)
            .count() as i16;
        let repeated = steps
            .iter()
            .filter(|&&t| t == RepetitionType::Repeated)
            .count() as i16;
        Ok(RepetitionPattern {
            steps,
            max_definition_level: non_required - 1,
            max_repetition_level: repeated - 1,
        })
    }

    /// Creates a pattern from a leaf-first path, as obtained by walking a
    /// schema from a leaf column up to its root.
    ///
    /// A root that is not `Repeated` is treated as `Repeated` with a warning,
    /// since a record sequence is always repeated regardless of how a schema
    /// labels its root.
    pub fn from_leaf_path(leaf_to_root: &[RepetitionType]) -> Result<RepetitionPattern> {
        let mut steps = leaf_to_root.iter().rev().copied().collect::<Vec<_>>();
        if let Some(root) = steps.first_mut() {
            if *root != RepetitionType::Repeated {
                warn!(
                    "repetition type of the root is {root}, treating it as {}",
                    RepetitionType::Repeated
                );
                *root = RepetitionType::Repeated;
            }
        }
        RepetitionPattern::new(steps)
    }

    pub fn steps(&self) -> &[RepetitionType] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn max_definition_level(&self) -> i16 {
        self.max_definition_level
    }

    pub fn max_repetition_level(&self) -> i16 {
        self.max_repetition_level
    }
}

impl FromStr for RepetitionPattern {
    type Err = Error;

    /// Parses a comma separated, root-first list of repetition types, e.g.
    /// `"repeated,optional,repeated"` or `"P,O,P"`.
    fn from_str(s: &str) -> Result<Self> {
        let steps = s
            .split(',')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<RepetitionType>>>()?;
        RepetitionPattern::new(steps)
    }
}
