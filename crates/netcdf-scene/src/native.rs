//! Thin helpers over the `netcdf` crate.
//!
//! Values are read as `f64` and unpacked the way CF-aware readers do:
//! `_FillValue` and `missing_value` cells become `NaN`, then
//! `scale_factor` and `add_offset` are applied.

use std::sync::Once;

use netcdf::AttributeValue;

/// Attributes consumed by unpacking and not carried onto the field.
pub(crate) const PACKING_ATTRIBUTES: &[&str] =
    &["scale_factor", "add_offset", "_FillValue", "missing_value"];

/// Silence HDF5's automatic error printing to stderr.
///
/// HDF5 prints a diagnostic stack whenever a lookup fails, even when the
/// caller handles the failure (probing for an optional attribute, say).
/// Safe to call many times; only the first call does anything.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with null handlers is the documented way to
        // turn off automatic error printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check for an attribute without triggering an HDF5 lookup error.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn attr(var: &netcdf::Variable, name: &str) -> Option<AttributeValue> {
    if !has_attr(var, name) {
        return None;
    }
    var.attribute_value(name)?.ok()
}

/// Every numeric element of an attribute. Strings parse if they can.
pub(crate) fn attr_numbers(value: &AttributeValue) -> Vec<f64> {
    match value {
        AttributeValue::Uchar(v) => vec![*v as f64],
        AttributeValue::Uchars(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Schar(v) => vec![*v as f64],
        AttributeValue::Schars(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Ushort(v) => vec![*v as f64],
        AttributeValue::Ushorts(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Short(v) => vec![*v as f64],
        AttributeValue::Shorts(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Uint(v) => vec![*v as f64],
        AttributeValue::Uints(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Int(v) => vec![*v as f64],
        AttributeValue::Ints(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Ulonglong(v) => vec![*v as f64],
        AttributeValue::Ulonglongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Longlong(v) => vec![*v as f64],
        AttributeValue::Longlongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Float(v) => vec![*v as f64],
        AttributeValue::Floats(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Double(v) => vec![*v],
        AttributeValue::Doubles(v) => v.clone(),
        AttributeValue::Str(s) => s.trim().parse().ok().into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Render any attribute as text, joining arrays with ", ".
pub(crate) fn attr_to_string(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => s.clone(),
        AttributeValue::Strs(v) => v.join(", "),
        other => attr_numbers(other)
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

pub(crate) fn f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    attr(var, name).and_then(|v| attr_numbers(&v).first().copied())
}

pub(crate) fn string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    attr(var, name).map(|v| attr_to_string(&v))
}

/// How stored values map to physical values.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Packing {
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub missing: Vec<f64>,
}

impl Packing {
    pub fn of(var: &netcdf::Variable) -> Self {
        let mut missing = Vec::new();
        for name in ["_FillValue", "missing_value"] {
            if let Some(value) = attr(var, name) {
                missing.extend(attr_numbers(&value));
            }
        }
        Self {
            scale_factor: f64_attr(var, "scale_factor"),
            add_offset: f64_attr(var, "add_offset"),
            missing,
        }
    }

    /// Mask then scale a single stored value.
    pub fn unpack(&self, raw: f64) -> f64 {
        if raw.is_nan() || self.missing.iter().any(|&m| m == raw) {
            return f64::NAN;
        }
        raw * self.scale_factor.unwrap_or(1.0) + self.add_offset.unwrap_or(0.0)
    }
}

/// Read all values of `var` and unpack them.
pub(crate) fn read_unpacked(var: &netcdf::Variable) -> Result<Vec<f64>, netcdf::Error> {
    let packing = Packing::of(var);
    let raw: Vec<f64> = var.get_values(..)?;
    Ok(raw.into_iter().map(|v| packing.unpack(v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_numbers() {
        assert_eq!(attr_numbers(&AttributeValue::Short(-1)), vec![-1.0]);
        assert_eq!(attr_numbers(&AttributeValue::Floats(vec![1.0, 2.0])), vec![1.0, 2.0]);
        assert_eq!(attr_numbers(&AttributeValue::Str(" 3.5 ".into())), vec![3.5]);
        assert!(attr_numbers(&AttributeValue::Str("K".into())).is_empty());
    }

    #[test]
    fn test_attr_to_string() {
        assert_eq!(attr_to_string(&AttributeValue::Str("K".into())), "K");
        assert_eq!(attr_to_string(&AttributeValue::Ints(vec![1, 2])), "1, 2");
    }

    #[test]
    fn test_unpack_masks_before_scaling() {
        let packing = Packing {
            scale_factor: Some(0.01),
            add_offset: Some(150.0),
            missing: vec![-1.0],
        };
        assert!(packing.unpack(-1.0).is_nan());
        assert!((packing.unpack(10000.0) - 250.0).abs() < 1e-9);
        assert!(packing.unpack(f64::NAN).is_nan());
    }

    #[test]
    fn test_unpack_without_attributes_is_identity() {
        assert_eq!(Packing::default().unpack(42.0), 42.0);
    }

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }
}
