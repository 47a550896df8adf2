//! Fields exchanged with calibrators, and the sources that supply them.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use ndarray::{Array3, ArrayView2, Axis};

use crate::config::MissingValue;
use crate::variable::VariableKind;

/// One variable at one time step, indexed `(lat, lon, ensemble_member)`.
///
/// Values are in physical units; "no data" is the canonical
/// [`MissingValue`] the field was created with.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    values: Array3<f32>,
}

impl Field {
    /// Field of the given shape with every value missing.
    pub fn missing(n_lat: usize, n_lon: usize, n_ens: usize, missing: MissingValue) -> Self {
        Self {
            values: Array3::from_elem((n_lat, n_lon, n_ens), missing.value()),
        }
    }

    /// Field of the given shape filled with `value`.
    pub fn filled(n_lat: usize, n_lon: usize, n_ens: usize, value: f32) -> Self {
        Self {
            values: Array3::from_elem((n_lat, n_lon, n_ens), value),
        }
    }

    /// Wrap an existing `(lat, lon, ensemble)` array.
    pub fn from_array(values: Array3<f32>) -> Self {
        Self { values }
    }

    /// `(n_lat, n_lon, n_ens)`.
    pub fn shape(&self) -> [usize; 3] {
        let (n_lat, n_lon, n_ens) = self.values.dim();
        [n_lat, n_lon, n_ens]
    }

    pub fn n_lat(&self) -> usize {
        self.values.dim().0
    }

    pub fn n_lon(&self) -> usize {
        self.values.dim().1
    }

    pub fn n_ens(&self) -> usize {
        self.values.dim().2
    }

    /// Value at a grid point and member, `None` if out of range.
    pub fn get(&self, lat: usize, lon: usize, ens: usize) -> Option<f32> {
        self.values.get((lat, lon, ens)).copied()
    }

    /// The spatial grid of one ensemble member.
    pub fn member(&self, ens: usize) -> ArrayView2<'_, f32> {
        self.values.index_axis(Axis(2), ens)
    }

    /// Number of values equal to the canonical missing value.
    pub fn count_missing(&self, missing: MissingValue) -> usize {
        self.values.iter().filter(|&&v| missing.is_missing(v)).count()
    }

    pub fn as_array(&self) -> &Array3<f32> {
        &self.values
    }
}

impl Index<(usize, usize, usize)> for Field {
    type Output = f32;

    fn index(&self, index: (usize, usize, usize)) -> &f32 {
        &self.values[index]
    }
}

impl IndexMut<(usize, usize, usize)> for Field {
    fn index_mut(&mut self, index: (usize, usize, usize)) -> &mut f32 {
        &mut self.values[index]
    }
}

/// Supplies fields to a write, one `(kind, time)` pair at a time.
///
/// Returning `None` means no data exists for that step; the write skips it.
pub trait FieldSource {
    fn field(&mut self, kind: VariableKind, time: usize) -> Option<Field>;
}

impl<F> FieldSource for F
where
    F: FnMut(VariableKind, usize) -> Option<Field>,
{
    fn field(&mut self, kind: VariableKind, time: usize) -> Option<Field> {
        self(kind, time)
    }
}

/// Owned fields keyed by `(kind, time)`.
///
/// Typical use: a calibrator reads fields, adjusts them, inserts them here
/// and hands the set to [`EnsembleFile::write`](crate::EnsembleFile::write).
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: HashMap<(VariableKind, usize), Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `field` for `(kind, time)`, returning any field it replaces.
    pub fn insert(&mut self, kind: VariableKind, time: usize, field: Field) -> Option<Field> {
        self.fields.insert((kind, time), field)
    }

    pub fn get(&self, kind: VariableKind, time: usize) -> Option<&Field> {
        self.fields.get(&(kind, time))
    }

    pub fn get_mut(&mut self, kind: VariableKind, time: usize) -> Option<&mut Field> {
        self.fields.get_mut(&(kind, time))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldSource for FieldSet {
    fn field(&mut self, kind: VariableKind, time: usize) -> Option<Field> {
        self.fields.get(&(kind, time)).cloned()
    }
}
