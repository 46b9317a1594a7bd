//! The fixed class label set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HatError;

/// Number of class labels.
pub const N_HOUSES: usize = 4;

/// A class label.
///
/// Declaration order is the enumeration order used everywhere: classifier
/// storage, probability columns, persisted weight maps, and argmax
/// tie-breaking (the first house wins a tie).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum House {
    /// Slytherin
    Slytherin,
    /// Gryffindor
    Gryffindor,
    /// Ravenclaw
    Ravenclaw,
    /// Hufflepuff
    Hufflepuff,
}

impl House {
    /// All houses in enumeration order.
    pub const ALL: [House; N_HOUSES] = [
        House::Slytherin,
        House::Gryffindor,
        House::Ravenclaw,
        House::Hufflepuff,
    ];

    /// Position of this house in [`House::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// House at position `index` of [`House::ALL`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name, as it appears in datasets.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            House::Slytherin => "Slytherin",
            House::Gryffindor => "Gryffindor",
            House::Ravenclaw => "Ravenclaw",
            House::Hufflepuff => "Hufflepuff",
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for House {
    type Err = HatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        House::ALL
            .into_iter()
            .find(|h| h.name() == s.trim())
            .ok_or_else(|| HatError::InvalidInput(format!("unknown house label '{s}'")))
    }
}
