use super::molecule::MolecularGraph;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupingError {
    #[error("Record {index} ('{title}') has no '{property}' data item")]
    MissingProperty {
        index: usize,
        title: String,
        property: String,
    },
    #[error("Maximum sample size must be at least 1")]
    ZeroSampleSize,
}

/// Conformers sharing one isomer identity.
#[derive(Debug, Clone, PartialEq)]
pub struct IsomerGroup {
    /// The value of the grouping data item.
    pub name: String,
    /// Retained conformers, in input order.
    pub conformers: Vec<MolecularGraph>,
    /// Number of records dropped because the group was already full.
    pub discarded: usize,
}

impl IsomerGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            conformers: Vec::new(),
            discarded: 0,
        }
    }

    pub fn sample_size(&self) -> usize {
        self.conformers.len()
    }
}

/// Splits a stream of records into isomer groups keyed by a data item.
///
/// Groups appear in the order their first record appears. Each group keeps at
/// most `max_sample_size` records; later records of a full group are counted
/// in [`IsomerGroup::discarded`] and dropped.
///
/// # Errors
///
/// Returns [`GroupingError`] if a record lacks the data item or the cap is zero.
pub fn group_by_property<I>(
    molecules: I,
    property: &str,
    max_sample_size: usize,
) -> Result<Vec<IsomerGroup>, GroupingError>
where
    I: IntoIterator<Item = MolecularGraph>,
{
    if max_sample_size == 0 {
        return Err(GroupingError::ZeroSampleSize);
    }

    let mut groups: Vec<IsomerGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, molecule) in molecules.into_iter().enumerate() {
        let Some(name) = molecule.property(property).map(|v| v.trim().to_string()) else {
            return Err(GroupingError::MissingProperty {
                index,
                title: molecule.title().to_string(),
                property: property.to_string(),
            });
        };

        let position = *positions.entry(name.clone()).or_insert_with(|| {
            groups.push(IsomerGroup::new(&name));
            groups.len() - 1
        });
        let group = &mut groups[position];
        if group.conformers.len() < max_sample_size {
            group.conformers.push(molecule);
        } else {
            group.discarded += 1;
        }
    }

    for group in groups.iter().filter(|g| g.discarded > 0) {
        debug!(
            group = %group.name,
            discarded = group.discarded,
            "Dropped records beyond the maximum sample size."
        );
    }

    Ok(groups)
}
