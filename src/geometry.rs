//! Reference-volume geometry.
//!
//! The reference volume (`brainref`) is the input object's grid with one axis
//! resampled: the slice-selection axis takes the requested output voxel size
//! divided by the slice-sampling factor, and its dimension is rescaled so the
//! field of view is preserved. The other two axes pass through untouched.

use serde::Serialize;

use crate::error::{PossumGenError, Result};
use crate::types::Axis;

/// Inputs to [`resolve`], already converted from FSF text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryInputs {
    /// Input object dimensions `[x, y, z]`.
    pub dims: [u32; 3],
    /// Number of volumes in the input object.
    pub temporal_extent: u32,
    /// Raw `inNt` text, forwarded as the fourth voxel size.
    pub pixdim4: String,
    /// Input voxel sizes `[x, y, z]`.
    pub voxel_sizes: [f64; 3],
    /// Requested output dimensions `[x, y, z]`. Validated but not part of the
    /// resampling formula.
    pub output_dims: [u32; 3],
    /// Requested output voxel sizes `[x, y, z]`.
    pub output_voxel_sizes: [f64; 3],
    pub sampling_factor: f64,
    pub slice_axis: Axis,
}

/// Geometry of the reference volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryResult {
    pub dims: [u32; 3],
    pub temporal_extent: u32,
    pub pixdims: [f64; 3],
    /// Same source value as `temporal_extent`, kept verbatim.
    pub pixdim4: String,
    pub slice_axis: Axis,
}

impl GeometryResult {
    /// Voxel size along the slice-selection axis, used as slice thickness.
    pub fn slice_thickness(&self) -> f64 {
        self.pixdims[self.slice_axis.index()]
    }
}

/// Compute the reference-volume geometry.
pub fn resolve(inputs: &GeometryInputs) -> Result<GeometryResult> {
    let axis = inputs.slice_axis;
    let i = axis.index();

    if !(inputs.sampling_factor.is_finite() && inputs.sampling_factor > 0.0) {
        return Err(PossumGenError::geometry(format!(
            "slice sampling factor must be positive, got {}",
            inputs.sampling_factor
        )));
    }
    if inputs.temporal_extent == 0 {
        return Err(PossumGenError::geometry(
            "temporal extent (inNt) must be at least 1",
        ));
    }

    let new_voxel = inputs.output_voxel_sizes[i] / inputs.sampling_factor;
    if !(new_voxel.is_finite() && new_voxel > 0.0) {
        return Err(PossumGenError::geometry(format!(
            "output voxel size on {} axis must be positive, got {}",
            axis, inputs.output_voxel_sizes[i]
        )));
    }

    let extent = f64::from(inputs.dims[i]) * inputs.voxel_sizes[i];
    let new_dim = (extent / new_voxel).round();
    if !new_dim.is_finite() || new_dim < 0.0 || new_dim > f64::from(u32::MAX) {
        return Err(PossumGenError::geometry(format!(
            "recomputed {} dimension {} is out of range",
            axis, new_dim
        )));
    }

    let mut dims = inputs.dims;
    let mut pixdims = inputs.voxel_sizes;
    dims[i] = new_dim as u32;
    pixdims[i] = new_voxel;

    Ok(GeometryResult {
        dims,
        temporal_extent: inputs.temporal_extent,
        pixdims,
        pixdim4: inputs.pixdim4.clone(),
        slice_axis: axis,
    })
}
