//! Dossier numbers (`YEAR/SEQ`)
//!
//! Numbers are entered by the operator and never enforced unique by the
//! store. The suggestion for a new dossier is the first free sequence of the
//! year, so a deleted dossier leaves a gap that gets reused.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DossierNumber {
    pub year: i32,
    pub sequence: u32,
}

impl DossierNumber {
    /// Key sorting the most recent dossiers first
    pub fn recent_first(&self) -> Reverse<(i32, u32)> {
        Reverse((self.year, self.sequence))
    }
}

impl FromStr for DossierNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::validation(format!("Numéro de dossier invalide : {}", s));
        let (year, sequence) = s.trim().split_once('/').ok_or_else(invalid)?;
        Ok(Self {
            year: year.trim().parse().map_err(|_| invalid())?,
            sequence: sequence.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for DossierNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.sequence)
    }
}

/// First unused sequence of `year` among `existing` numbers.
pub fn next_dossier_number<'a, I>(existing: I, year: i32) -> DossierNumber
where
    I: IntoIterator<Item = &'a str>,
{
    let used: BTreeSet<u32> = existing
        .into_iter()
        .filter_map(|n| n.parse::<DossierNumber>().ok())
        .filter(|n| n.year == year)
        .map(|n| n.sequence)
        .collect();

    let sequence = (1u32..).find(|s| !used.contains(s)).unwrap_or(1);

    DossierNumber { year, sequence }
}
