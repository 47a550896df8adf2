//! In-memory [`ArrayStore`].
//!
//! Mirrors the NetCDF semantics the access layer relies on: named
//! dimensions, variables over ordered dimension lists, numeric attributes
//! and hyperslab reads and writes. Useful for staging synthetic files and
//! for tests that should not touch the filesystem.

use std::collections::BTreeMap;

use super::{ArrayStore, NC_FILL_FLOAT};
use crate::error::{FieldError, Result};

#[derive(Debug, Clone)]
struct MemoryVariable {
    dimensions: Vec<String>,
    shape: Vec<usize>,
    attributes: BTreeMap<String, f32>,
    /// Allocated on first write so a `_FillValue` set after creation applies.
    data: Option<Vec<f32>>,
}

impl MemoryVariable {
    fn fill_value(&self) -> f32 {
        self.attributes
            .get("_FillValue")
            .copied()
            .unwrap_or(NC_FILL_FLOAT)
    }

    fn len(&self) -> usize {
        self.shape.iter().product()
    }
}

/// A self-describing array file held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    label: String,
    dimensions: BTreeMap<String, usize>,
    variables: BTreeMap<String, MemoryVariable>,
}

impl MemoryStore {
    /// Create an empty store. `label` appears in error messages.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            dimensions: BTreeMap::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Builder form of [`ArrayStore::create_dimension`].
    pub fn with_dimension(mut self, name: &str, len: usize) -> Result<Self> {
        self.create_dimension(name, len)?;
        Ok(self)
    }

    /// Add a variable and fill it with `values` in one step.
    pub fn with_variable(mut self, name: &str, dimensions: &[&str], values: Vec<f32>) -> Result<Self> {
        self.create_variable_f32(name, dimensions)?;
        let shape = self.variables[name].shape.clone();
        if values.len() != shape.iter().product::<usize>() {
            return Err(FieldError::ShapeMismatch {
                file: self.label.clone(),
                variable: name.to_string(),
                expected: shape.iter().product(),
                actual: values.len(),
            });
        }
        let start = vec![0; shape.len()];
        self.write_f32(name, &start, &shape, &values)?;
        Ok(self)
    }

    /// Builder form of [`ArrayStore::put_attribute_f32`].
    pub fn with_attribute(mut self, name: &str, attribute: &str, value: f32) -> Result<Self> {
        self.put_attribute_f32(name, attribute, value)?;
        Ok(self)
    }

    fn variable(&self, name: &str) -> Result<&MemoryVariable> {
        self.variables
            .get(name)
            .ok_or_else(|| FieldError::missing_variable(&self.label, name))
    }

    /// Flat offsets of every element in the hyperslab, row-major.
    fn hyperslab(&self, name: &str, var: &MemoryVariable, start: &[usize], count: &[usize]) -> Result<Vec<usize>> {
        let rank = var.shape.len();
        if start.len() != rank || count.len() != rank {
            return Err(FieldError::storage(
                &self.label,
                format!(
                    "'{}' has {} dimensions, got start/count of length {}/{}",
                    name,
                    rank,
                    start.len(),
                    count.len()
                ),
            ));
        }
        for axis in 0..rank {
            if start[axis] + count[axis] > var.shape[axis] {
                return Err(FieldError::storage(
                    &self.label,
                    format!(
                        "'{}': index {}..{} exceeds dimension '{}' of length {}",
                        name,
                        start[axis],
                        start[axis] + count[axis],
                        var.dimensions[axis],
                        var.shape[axis]
                    ),
                ));
            }
        }

        let total: usize = count.iter().product();
        let mut offsets = Vec::with_capacity(total);
        let mut index = vec![0usize; rank];
        for _ in 0..total {
            let mut flat = 0;
            for axis in 0..rank {
                flat = flat * var.shape[axis] + start[axis] + index[axis];
            }
            offsets.push(flat);
            // Odometer increment, fastest axis last.
            for axis in (0..rank).rev() {
                index[axis] += 1;
                if index[axis] < count[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        Ok(offsets)
    }
}

impl ArrayStore for MemoryStore {
    fn label(&self) -> &str {
        &self.label
    }

    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.dimensions.get(name).copied()
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn variable_dimensions(&self, name: &str) -> Option<Vec<String>> {
        self.variables.get(name).map(|var| var.dimensions.clone())
    }

    fn variable_len(&self, name: &str) -> Option<usize> {
        self.variables.get(name).map(MemoryVariable::len)
    }

    fn read_f32(&self, name: &str, start: &[usize], count: &[usize]) -> Result<Vec<f32>> {
        let var = self.variable(name)?;
        let offsets = self.hyperslab(name, var, start, count)?;
        let values = match &var.data {
            Some(data) => offsets.iter().map(|&i| data[i]).collect(),
            None => vec![var.fill_value(); offsets.len()],
        };
        Ok(values)
    }

    fn attribute_f32(&self, name: &str, attribute: &str) -> Result<Option<f32>> {
        Ok(self.variable(name)?.attributes.get(attribute).copied())
    }

    fn create_dimension(&mut self, name: &str, len: usize) -> Result<()> {
        if self.dimensions.contains_key(name) {
            return Err(FieldError::storage(
                &self.label,
                format!("dimension '{}' already exists", name),
            ));
        }
        self.dimensions.insert(name.to_string(), len);
        Ok(())
    }

    fn create_variable_f32(&mut self, name: &str, dimensions: &[&str]) -> Result<()> {
        if self.variables.contains_key(name) {
            return Err(FieldError::storage(
                &self.label,
                format!("variable '{}' already exists", name),
            ));
        }
        let shape = dimensions
            .iter()
            .map(|dim| {
                self.dimension_len(dim)
                    .ok_or_else(|| FieldError::missing_dimension(&self.label, *dim))
            })
            .collect::<Result<Vec<_>>>()?;
        self.variables.insert(
            name.to_string(),
            MemoryVariable {
                dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
                shape,
                attributes: BTreeMap::new(),
                data: None,
            },
        );
        Ok(())
    }

    fn put_attribute_f32(&mut self, name: &str, attribute: &str, value: f32) -> Result<()> {
        let label = self.label.clone();
        let var = self
            .variables
            .get_mut(name)
            .ok_or_else(|| FieldError::missing_variable(label, name))?;
        var.attributes.insert(attribute.to_string(), value);
        Ok(())
    }

    fn write_f32(
        &mut self,
        name: &str,
        start: &[usize],
        count: &[usize],
        values: &[f32],
    ) -> Result<()> {
        let offsets = {
            let var = self.variable(name)?;
            self.hyperslab(name, var, start, count)?
        };
        if offsets.len() != values.len() {
            return Err(FieldError::storage(
                &self.label,
                format!(
                    "'{}': hyperslab holds {} values, got {}",
                    name,
                    offsets.len(),
                    values.len()
                ),
            ));
        }
        let var = self
            .variables
            .get_mut(name)
            .ok_or_else(|| FieldError::missing_variable(&self.label, name))?;
        let fill = var.fill_value();
        let len = var.len();
        let data = var.data.get_or_insert_with(|| vec![fill; len]);
        for (&offset, &value) in offsets.iter().zip(values) {
            data[offset] = value;
        }
        Ok(())
    }
}
