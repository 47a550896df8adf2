//! Linear quantization between stored raw values and physical values.
//!
//! Stored values follow the CF packing convention:
//! `physical = scale_factor * raw + add_offset`. A raw value equal to the
//! variable's own sentinel (`_FillValue`, else `missing_value`) means "no
//! data" and maps to the canonical [`MissingValue`] instead.

use ndarray::Array3;

use crate::config::MissingValue;
use crate::error::Result;
use crate::field::Field;
use crate::store::ArrayStore;

/// Attribute holding the multiplicative packing factor.
pub const SCALE_ATTR: &str = "scale_factor";
/// Attribute holding the additive packing offset.
pub const OFFSET_ATTR: &str = "add_offset";
/// Attributes holding the native missing sentinel, in lookup order.
pub const MISSING_ATTRS: [&str; 2] = ["_FillValue", "missing_value"];

/// Packing parameters of one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantization {
    pub scale: f32,
    pub offset: f32,
    /// Native missing sentinel. `None` disables substitution.
    pub missing: Option<f32>,
}

impl Default for Quantization {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quantization {
    /// No scaling, no offset, no sentinel.
    pub const IDENTITY: Quantization = Quantization {
        scale: 1.0,
        offset: 0.0,
        missing: None,
    };

    pub fn new(scale: f32, offset: f32, missing: Option<f32>) -> Self {
        Self {
            scale,
            offset,
            missing,
        }
    }

    /// Read the packing attributes of `variable`.
    ///
    /// Absent scale or offset default to 1 and 0. Always re-read; variables
    /// in the same file may be packed differently.
    pub fn from_store<S: ArrayStore + ?Sized>(store: &S, variable: &str) -> Result<Self> {
        let scale = store.attribute_f32(variable, SCALE_ATTR)?.unwrap_or(1.0);
        let offset = store.attribute_f32(variable, OFFSET_ATTR)?.unwrap_or(0.0);
        let mut missing = None;
        for attr in MISSING_ATTRS {
            if let Some(value) = store.attribute_f32(variable, attr)? {
                missing = Some(value);
                break;
            }
        }
        Ok(Self {
            scale,
            offset,
            missing,
        })
    }

    fn is_native_missing(&self, raw: f32) -> bool {
        match self.missing {
            Some(sentinel) if sentinel.is_nan() => raw.is_nan(),
            Some(sentinel) => raw == sentinel,
            None => false,
        }
    }

    /// Raw stored value to physical value.
    pub fn decode(&self, raw: f32, canonical: MissingValue) -> f32 {
        if self.is_native_missing(raw) {
            canonical.value()
        } else {
            self.scale * raw + self.offset
        }
    }

    /// Physical value to raw stored value.
    pub fn encode(&self, physical: f32, canonical: MissingValue) -> f32 {
        match self.missing {
            Some(sentinel) if canonical.is_missing(physical) => sentinel,
            _ => (physical - self.offset) / self.scale,
        }
    }

    /// Decode a raw `(ensemble, lat, lon)` block into a field.
    ///
    /// `raw` is ensemble-major, then latitude, then longitude. Callers check
    /// its length against `n_ens * n_lat * n_lon`; cells past the end of a
    /// short block stay at the canonical missing value.
    pub(crate) fn decode_block(
        &self,
        raw: &[f32],
        n_ens: usize,
        n_lat: usize,
        n_lon: usize,
        canonical: MissingValue,
    ) -> Field {
        let mut values = Array3::from_elem((n_lat, n_lon, n_ens), canonical.value());
        let mut raw = raw.iter();
        'members: for e in 0..n_ens {
            for lat in 0..n_lat {
                for lon in 0..n_lon {
                    let Some(&stored) = raw.next() else {
                        break 'members;
                    };
                    values[(lat, lon, e)] = self.decode(stored, canonical);
                }
            }
        }
        Field::from_array(values)
    }

    /// Encode a field into a raw block in the same order `decode_block` reads.
    pub fn encode_block(&self, field: &Field, canonical: MissingValue) -> Vec<f32> {
        let [n_lat, n_lon, n_ens] = field.shape();
        let mut raw = Vec::with_capacity(n_ens * n_lat * n_lon);
        for e in 0..n_ens {
            for lat in 0..n_lat {
                for lon in 0..n_lon {
                    raw.push(self.encode(field[(lat, lon, e)], canonical));
                }
            }
        }
        raw
    }
}
