//! Tuning parameters and the Cartesian configuration space they span.

use crate::error::TuneError;

/// One named, independently-varying search dimension.
#[derive(Debug, Clone)]
pub struct TuningParameter {
    name: String,
    values: Vec<u32>,
}

impl TuningParameter {
    pub fn new(name: impl Into<String>, values: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

/// An insertion-ordered set of tuning parameters defining the full
/// Cartesian product of candidate assignments.
///
/// Enumeration is deterministic: the first-declared parameter varies
/// slowest, the last-declared fastest. Callers diff result logs across
/// runs, so this order is part of the contract.
#[derive(Debug, Clone, Default)]
pub struct TuningConfigurationSpace {
    params: Vec<TuningParameter>,
}

impl TuningConfigurationSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter. Names must be unique within a space.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        values: Vec<u32>,
    ) -> Result<(), TuneError> {
        let name = name.into();
        if self.params.iter().any(|p| p.name == name) {
            return Err(TuneError::DuplicateParameter(name));
        }
        self.params.push(TuningParameter::new(name, values));
        Ok(())
    }

    pub fn parameters(&self) -> &[TuningParameter] {
        &self.params
    }

    /// Total number of points in the Cartesian product.
    pub fn len(&self) -> usize {
        if self.params.is_empty() {
            return 0;
        }
        self.params.iter().map(|p| p.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh, restartable enumeration of the full product. Two
    /// enumerations of the same space yield identical sequences.
    pub fn assignments(&self) -> AssignmentIter<'_> {
        AssignmentIter {
            space: self,
            cursor: vec![0; self.params.len()],
            exhausted: self.is_empty(),
        }
    }
}

/// One concrete point of the Cartesian product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterAssignment {
    entries: Vec<(String, u32)>,
}

impl ParameterAssignment {
    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    /// Values in parameter declaration order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|&(_, v)| v)
    }
}

/// Odometer-style lazy walk over the product: the last-declared
/// parameter's index advances on every step and carries leftward.
pub struct AssignmentIter<'a> {
    space: &'a TuningConfigurationSpace,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl Iterator for AssignmentIter<'_> {
    type Item = ParameterAssignment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let entries = self
            .space
            .params
            .iter()
            .zip(&self.cursor)
            .map(|(p, &i)| (p.name.clone(), p.values[i]))
            .collect();

        for slot in (0..self.cursor.len()).rev() {
            self.cursor[slot] += 1;
            if self.cursor[slot] < self.space.params[slot].values.len() {
                break;
            }
            self.cursor[slot] = 0;
            if slot == 0 {
                self.exhausted = true;
            }
        }

        Some(ParameterAssignment { entries })
    }
}
