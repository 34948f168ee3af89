//! Raw-to-physical conversion for data fields.
//!
//! The normalizer turns a raw [`DataField`] into a [`NormalizedField`]:
//! a 2-D f64 plane where every invalid cell is exactly NaN and an
//! explicit validity mask records which cells survived. The stages run
//! in a fixed order:
//!
//! 1. plane selection (3-D/4-D products plot one 2-D plane)
//! 2. raw integer transform (bit shift + flag ceiling, where a product
//!    packs flags into the low bits)
//! 3. subsampling (before masking — fill/valid-range attributes apply
//!    to the subsampled cells, not the full-resolution source)
//! 4. fill-sentinel and valid-range masking, invalid cells set to NaN
//! 5. scale/offset: `physical = (raw - add_offset) * scale_factor`
//!
//! The offset-then-scale order matches the producing instruments'
//! documented convention; scale-then-offset is numerically different
//! and wrong here.

use map_common::{DataField, MapError, MapResult};
use tracing::debug;

/// Where the fill sentinel comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SentinelPolicy {
    /// Use the field's `fill_value` attribute; its absence is fatal.
    FromAttributes,
    /// A hardcoded per-product constant.
    Literal(f64),
    /// The raw value found at a fixed (row, col) of the selected,
    /// subsampled plane. Some products define fill only by example.
    ReferenceCell(usize, usize),
}

/// Optional transform applied to raw integer values before masking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTransform {
    /// Shift raw values right by `bits`, then invalidate any shifted
    /// value above `flag_ceiling` (flag data packed above the
    /// measurement range). The fill sentinel is still compared against
    /// the unshifted value.
    RightShift { bits: u32, flag_ceiling: Option<f64> },
}

/// Stride/offset subsampling along both spatial axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subsample {
    pub row_start: usize,
    pub row_stride: usize,
    pub col_start: usize,
    pub col_stride: usize,
}

impl Subsample {
    /// Every k-th row and column starting at 0.
    pub fn stride(k: usize) -> Self {
        Self {
            row_start: 0,
            row_stride: k,
            col_start: 0,
            col_stride: k,
        }
    }

    /// Every k-th row and column starting at `start` (the `[4::5]`
    /// slicing used when geolocation is stored at 1/5 resolution
    /// anchored on the fifth sample).
    pub fn offset_stride(start: usize, k: usize) -> Self {
        Self {
            row_start: start,
            row_stride: k,
            col_start: start,
            col_stride: k,
        }
    }
}

/// Everything the normalizer needs to know about one product's field.
#[derive(Debug, Clone)]
pub struct NormalizeSpec {
    /// Indices pinning every leading dimension beyond the trailing two
    /// (empty for 2-D fields). `[2]` selects `field[2, :, :]`.
    pub plane: Vec<usize>,
    pub raw_transform: Option<RawTransform>,
    pub subsample: Option<Subsample>,
    pub sentinel: SentinelPolicy,
}

impl NormalizeSpec {
    /// The common case: 2-D field, fill value from attributes, no
    /// subsampling.
    pub fn from_attributes() -> Self {
        Self {
            plane: Vec::new(),
            raw_transform: None,
            subsample: None,
            sentinel: SentinelPolicy::FromAttributes,
        }
    }
}

/// A field after normalization: physical values, invalid cells NaN,
/// with an explicit validity mask keyed on the NaN positions.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    pub values: Vec<f64>,
    /// true where the cell is valid (not NaN)
    pub mask: Vec<bool>,
    pub rows: usize,
    pub cols: usize,
}

impl NormalizedField {
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.mask[row * self.cols + col]
    }

    /// (min, max) over valid cells; None when everything is masked.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for (&v, &ok) in self.values.iter().zip(&self.mask) {
            if ok {
                range = Some(match range {
                    None => (v, v),
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                });
            }
        }
        range
    }
}

/// Normalize a raw field and validate its shape against the
/// coordinates it will be plotted with.
///
/// A coordinate/data shape disagreement is a contract violation and
/// fails with ShapeMismatch; the renderer never sees mismatched inputs.
pub fn normalize(
    field: &DataField,
    spec: &NormalizeSpec,
    coord_shape: (usize, usize),
) -> MapResult<NormalizedField> {
    let normalized = normalize_unchecked(field, spec)?;

    if (normalized.rows, normalized.cols) != coord_shape {
        return Err(MapError::ShapeMismatch {
            data_rows: normalized.rows,
            data_cols: normalized.cols,
            coord_rows: coord_shape.0,
            coord_cols: coord_shape.1,
        });
    }

    Ok(normalized)
}

/// Normalize without the coordinate-shape check (for callers that
/// derive coordinates from the result, e.g. computed linear grids).
pub fn normalize_unchecked(field: &DataField, spec: &NormalizeSpec) -> MapResult<NormalizedField> {
    let (raw, rows, cols) = select_plane(field, &spec.plane)?;
    let (raw, rows, cols) = subsampled(&raw, rows, cols, spec.subsample);

    // Working values carry the raw transform; sentinel comparison stays
    // on the untransformed values.
    let working: Vec<f64> = match spec.raw_transform {
        Some(RawTransform::RightShift { bits, .. }) => {
            raw.iter().map(|&v| ((v as i64) >> bits) as f64).collect()
        }
        None => raw.clone(),
    };

    let sentinel = resolve_sentinel(field, spec, &raw, cols)?;
    let valid_range = field.attrs.valid_range;
    let flag_ceiling = match spec.raw_transform {
        Some(RawTransform::RightShift { flag_ceiling, .. }) => flag_ceiling,
        None => None,
    };

    let mut values = Vec::with_capacity(working.len());
    let mut mask = Vec::with_capacity(working.len());

    for (&r, &w) in raw.iter().zip(&working) {
        let mut invalid = sentinel.map_or(false, |s| r == s);
        if let Some((lo, hi)) = valid_range {
            invalid = invalid || w < lo || w > hi;
        }
        if let Some(ceiling) = flag_ceiling {
            invalid = invalid || w > ceiling;
        }

        if invalid {
            values.push(f64::NAN);
            mask.push(false);
        } else {
            values.push(apply_scale_offset(w, &field.attrs));
            mask.push(true);
        }
    }

    debug!(
        field = %field.name,
        rows,
        cols,
        masked = mask.iter().filter(|&&m| !m).count(),
        "normalized field"
    );

    Ok(NormalizedField {
        values,
        mask,
        rows,
        cols,
    })
}

/// `physical = (raw - add_offset) * scale_factor`, degrading gracefully
/// when only one attribute is present.
fn apply_scale_offset(raw: f64, attrs: &map_common::FieldAttributes) -> f64 {
    match (attrs.scale_factor, attrs.add_offset) {
        (Some(scale), Some(offset)) => (raw - offset) * scale,
        (Some(scale), None) => raw * scale,
        (None, Some(offset)) => raw - offset,
        (None, None) => raw,
    }
}

/// Pin leading dimensions to `plane` indices, yielding the trailing 2-D
/// array. 1-D fields (swath vectors) become a single-row plane.
fn select_plane(field: &DataField, plane: &[usize]) -> MapResult<(Vec<f64>, usize, usize)> {
    let shape = &field.shape;

    if shape.len() == 1 && plane.is_empty() {
        return Ok((field.values.clone(), 1, shape[0]));
    }

    if shape.len() != plane.len() + 2 {
        return Err(MapError::Format(format!(
            "field '{}' has rank {} but plane selection pins {} leading dimensions",
            field.name,
            shape.len(),
            plane.len()
        )));
    }

    let rows = shape[shape.len() - 2];
    let cols = shape[shape.len() - 1];
    let plane_len = rows * cols;

    // Flat offset of the selected plane.
    let mut offset = 0usize;
    for (axis, &idx) in plane.iter().enumerate() {
        if idx >= shape[axis] {
            return Err(MapError::Format(format!(
                "plane index {} out of range for dimension {} of field '{}' (size {})",
                idx, axis, field.name, shape[axis]
            )));
        }
        let stride: usize = shape[axis + 1..].iter().product();
        offset += idx * stride;
    }

    Ok((
        field.values[offset..offset + plane_len].to_vec(),
        rows,
        cols,
    ))
}

fn subsampled(
    values: &[f64],
    rows: usize,
    cols: usize,
    subsample: Option<Subsample>,
) -> (Vec<f64>, usize, usize) {
    let Some(s) = subsample else {
        return (values.to_vec(), rows, cols);
    };

    let row_idx: Vec<usize> = (s.row_start..rows).step_by(s.row_stride.max(1)).collect();
    let col_idx: Vec<usize> = (s.col_start..cols).step_by(s.col_stride.max(1)).collect();

    let mut out = Vec::with_capacity(row_idx.len() * col_idx.len());
    for &r in &row_idx {
        for &c in &col_idx {
            out.push(values[r * cols + c]);
        }
    }

    (out, row_idx.len(), col_idx.len())
}

fn resolve_sentinel(
    field: &DataField,
    spec: &NormalizeSpec,
    raw: &[f64],
    cols: usize,
) -> MapResult<Option<f64>> {
    match spec.sentinel {
        SentinelPolicy::Literal(v) => Ok(Some(v)),
        SentinelPolicy::ReferenceCell(r, c) => raw
            .get(r * cols + c)
            .copied()
            .map(Some)
            .ok_or_else(|| {
                MapError::Format(format!(
                    "reference cell ({}, {}) outside field '{}'",
                    r, c, field.name
                ))
            }),
        SentinelPolicy::FromAttributes => {
            field
                .attrs
                .fill_value
                .map(Some)
                .ok_or_else(|| MapError::AttributeMissing {
                    field: field.name.clone(),
                    attribute: "fill_value".to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::FieldAttributes;

    fn field(values: Vec<f64>, shape: Vec<usize>, attrs: FieldAttributes) -> DataField {
        DataField {
            name: "test".into(),
            values,
            shape,
            attrs,
        }
    }

    #[test]
    fn test_fill_and_valid_range_masking() {
        let attrs = FieldAttributes {
            fill_value: Some(9999.0),
            valid_range: Some((0.0, 100.0)),
            ..Default::default()
        };
        let f = field(vec![10.0, 9999.0, 150.0, -5.0, 50.0, 100.0], vec![2, 3], attrs);

        let out = normalize_unchecked(&f, &NormalizeSpec::from_attributes()).unwrap();

        assert!(out.values[1].is_nan() && !out.mask[1]); // fill
        assert!(out.values[2].is_nan() && !out.mask[2]); // above range
        assert!(out.values[3].is_nan() && !out.mask[3]); // below range
        for i in [0, 4, 5] {
            assert!(out.mask[i]);
            assert!(!out.values[i].is_nan());
        }
        // Nothing outside the range or equal to the sentinel survives.
        for (&v, &ok) in out.values.iter().zip(&out.mask) {
            if ok {
                assert!((0.0..=100.0).contains(&v) && v != 9999.0);
            }
        }
    }

    #[test]
    fn test_offset_then_scale_order() {
        // (10 - 2) * 0.5 = 4.0; scale-then-offset would give 3.0.
        let attrs = FieldAttributes {
            fill_value: Some(-1.0),
            scale_factor: Some(0.5),
            add_offset: Some(2.0),
            ..Default::default()
        };
        let f = field(vec![10.0], vec![1, 1], attrs);

        let out = normalize_unchecked(&f, &NormalizeSpec::from_attributes()).unwrap();
        assert_eq!(out.values[0], 4.0);
        assert_ne!(out.values[0], 3.0);
    }

    #[test]
    fn test_subsample_before_masking() {
        // 4x6 field, stride 2: shape becomes ceil(4/2) x ceil(6/2) = 2x3.
        // The fill cell at full-resolution (0,1) is skipped by the
        // stride, so no masking happens at all.
        let mut values = vec![1.0; 24];
        values[1] = 9999.0;
        let attrs = FieldAttributes {
            fill_value: Some(9999.0),
            ..Default::default()
        };
        let f = field(values, vec![4, 6], attrs);

        let spec = NormalizeSpec {
            subsample: Some(Subsample::stride(2)),
            ..NormalizeSpec::from_attributes()
        };
        let out = normalize_unchecked(&f, &spec).unwrap();

        assert_eq!((out.rows, out.cols), (2, 3));
        assert!(out.mask.iter().all(|&m| m));
    }

    #[test]
    fn test_offset_stride_subsample() {
        // 10 columns sliced [4::5] -> indices 4, 9.
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let attrs = FieldAttributes {
            fill_value: Some(-1.0),
            ..Default::default()
        };
        let f = field(values, vec![1, 10], attrs);

        let spec = NormalizeSpec {
            subsample: Some(Subsample {
                row_start: 0,
                row_stride: 1,
                col_start: 4,
                col_stride: 5,
            }),
            ..NormalizeSpec::from_attributes()
        };
        let out = normalize_unchecked(&f, &spec).unwrap();
        assert_eq!((out.rows, out.cols), (1, 2));
        assert_eq!(out.values, vec![4.0, 9.0]);
    }

    #[test]
    fn test_reference_cell_sentinel() {
        let f = field(
            vec![7.0, 1.0, 7.0, 2.0],
            vec![2, 2],
            FieldAttributes::default(),
        );
        let spec = NormalizeSpec {
            sentinel: SentinelPolicy::ReferenceCell(0, 0),
            ..NormalizeSpec::from_attributes()
        };
        let out = normalize_unchecked(&f, &spec).unwrap();

        assert!(!out.is_valid(0, 0));
        assert!(!out.is_valid(1, 0));
        assert!(out.is_valid(0, 1));
        assert!(out.is_valid(1, 1));
    }

    #[test]
    fn test_right_shift_with_flag_ceiling() {
        // Raw 16-bit values with 2 flag bits in the low positions, and
        // shifted values above the ceiling marked as flag data.
        let attrs = FieldAttributes {
            fill_value: Some(65515.0),
            scale_factor: Some(0.5),
            ..Default::default()
        };
        let f = field(vec![40.0, 65515.0, 65512.0], vec![1, 3], attrs);

        let spec = NormalizeSpec {
            raw_transform: Some(RawTransform::RightShift {
                bits: 2,
                flag_ceiling: Some(16376.0),
            }),
            ..NormalizeSpec::from_attributes()
        };
        let out = normalize_unchecked(&f, &spec).unwrap();

        assert_eq!(out.values[0], 5.0); // (40 >> 2) * 0.5
        assert!(out.values[1].is_nan()); // fill, compared unshifted
        assert!(out.values[2].is_nan()); // 65512 >> 2 = 16378 > 16376
    }

    #[test]
    fn test_plane_selection() {
        // 2x2x2: plane [1] selects the second 2x2 slab.
        let values: Vec<f64> = (0..8).map(f64::from).collect();
        let attrs = FieldAttributes {
            fill_value: Some(-1.0),
            ..Default::default()
        };
        let f = field(values, vec![2, 2, 2], attrs);

        let spec = NormalizeSpec {
            plane: vec![1],
            ..NormalizeSpec::from_attributes()
        };
        let out = normalize_unchecked(&f, &spec).unwrap();
        assert_eq!(out.values, vec![4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let attrs = FieldAttributes {
            fill_value: Some(-1.0),
            ..Default::default()
        };
        let f = field(vec![0.0; 20], vec![4, 5], attrs);

        // Coordinates at half resolution with no stride declared.
        let err = normalize(&f, &NormalizeSpec::from_attributes(), (2, 3)).unwrap_err();
        assert!(matches!(err, MapError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_missing_fill_attribute_is_fatal() {
        let f = field(vec![1.0], vec![1, 1], FieldAttributes::default());
        let err = normalize_unchecked(&f, &NormalizeSpec::from_attributes()).unwrap_err();
        assert!(matches!(err, MapError::AttributeMissing { .. }));
    }

    #[test]
    fn test_idempotence_bit_identical() {
        let attrs = FieldAttributes {
            fill_value: Some(9999.0),
            valid_range: Some((0.0, 100.0)),
            scale_factor: Some(0.1),
            add_offset: Some(3.0),
            ..Default::default()
        };
        let f = field(vec![10.0, 9999.0, 33.0, 101.0], vec![2, 2], attrs);

        let a = normalize_unchecked(&f, &NormalizeSpec::from_attributes()).unwrap();
        let b = normalize_unchecked(&f, &NormalizeSpec::from_attributes()).unwrap();

        let bits_a: Vec<u64> = a.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
        assert_eq!(a.mask, b.mask);
    }
}
