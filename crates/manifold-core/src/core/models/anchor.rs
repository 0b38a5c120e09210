use super::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction convention of the eigenvector chosen as a PD's conformational coordinate.
///
/// `Forward` keeps the eigenvector as computed, `Reverse` flips its sign. The
/// integer index mapping (`Forward <-> 0`, `Reverse <-> 1`) is the order in which
/// selection lists present the two options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    #[serde(rename = "fwd", alias = "forward")]
    Forward,
    #[serde(rename = "rev", alias = "reverse")]
    Reverse,
}

impl Sense {
    pub const ALL: [Sense; 2] = [Sense::Forward, Sense::Reverse];

    /// Maps a selection-list index back to a sense.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidSenseIndex`] for any index other than 0 or 1.
    pub fn from_index(index: usize) -> Result<Self, ModelError> {
        match index {
            0 => Ok(Sense::Forward),
            1 => Ok(Sense::Reverse),
            other => Err(ModelError::InvalidSenseIndex(other)),
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Sense::Forward => 0,
            Sense::Reverse => 1,
        }
    }

    /// Sign applied to the chosen eigenvector downstream.
    pub fn sign(self) -> i8 {
        match self {
            Sense::Forward => 1,
            Sense::Reverse => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sense::Forward => "FWD",
            Sense::Reverse => "REV",
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sense {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fwd" | "forward" | "0" => Ok(Sense::Forward),
            "rev" | "reverse" | "1" => Ok(Sense::Reverse),
            _ => Err(ModelError::UnknownSense(s.to_string())),
        }
    }
}

/// A user-confirmed conformational coordinate for a single PD.
///
/// `cc_index` is the 1-based index of the eigenvector (psi) the user picked.
/// Anchors carry no identity of their own; they are compared by value and only
/// mean something when attached to a PD in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub cc_index: u32,
    pub sense: Sense,
}

impl Anchor {
    /// # Errors
    ///
    /// Returns [`ModelError::ZeroCcIndex`] if `cc_index` is zero.
    pub fn new(cc_index: u32, sense: Sense) -> Result<Self, ModelError> {
        if cc_index == 0 {
            return Err(ModelError::ZeroCcIndex);
        }
        Ok(Self { cc_index, sense })
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            cc_index: 1,
            sense: Sense::Forward,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CC Psi{} ({})", self.cc_index, self.sense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sense_index_round_trips_for_both_values() {
        for sense in Sense::ALL {
            assert_eq!(Sense::from_index(sense.to_index()).unwrap(), sense);
        }
        assert_eq!(Sense::Forward.to_index(), 0);
        assert_eq!(Sense::Reverse.to_index(), 1);
    }

    #[test]
    fn sense_from_index_rejects_out_of_range_values() {
        assert_eq!(Sense::from_index(2), Err(ModelError::InvalidSenseIndex(2)));
        assert_eq!(
            Sense::from_index(usize::MAX),
            Err(ModelError::InvalidSenseIndex(usize::MAX))
        );
    }

    #[test]
    fn sense_sign_follows_direction() {
        assert_eq!(Sense::Forward.sign(), 1);
        assert_eq!(Sense::Reverse.sign(), -1);
    }

    #[test]
    fn sense_parses_labels_and_indices() {
        assert_eq!("FWD".parse::<Sense>().unwrap(), Sense::Forward);
        assert_eq!("reverse".parse::<Sense>().unwrap(), Sense::Reverse);
        assert_eq!(" 1 ".parse::<Sense>().unwrap(), Sense::Reverse);
        assert!(matches!(
            "sideways".parse::<Sense>(),
            Err(ModelError::UnknownSense(_))
        ));
    }

    #[test]
    fn anchor_default_is_first_cc_forward() {
        let anchor = Anchor::default();
        assert_eq!(anchor.cc_index, 1);
        assert_eq!(anchor.sense, Sense::Forward);
    }

    #[test]
    fn anchor_new_rejects_zero_cc_index() {
        assert_eq!(Anchor::new(0, Sense::Forward), Err(ModelError::ZeroCcIndex));
        assert_eq!(
            Anchor::new(3, Sense::Reverse).unwrap(),
            Anchor {
                cc_index: 3,
                sense: Sense::Reverse
            }
        );
    }
}
