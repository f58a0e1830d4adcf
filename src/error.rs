//! Error type shared by every stage of the crate.

use crate::fft::FftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticError {
    /// Transform axis outside `[0, dimension)`.
    InvalidAxis { axis: usize, dimension: usize },
    /// Extents disagree between two stages, e.g. a spectral hook returned a
    /// line of the wrong length or array data does not fill its shape.
    ShapeMismatch { expected: usize, found: usize },
    /// Requested region is not inside the array's largest region.
    InvalidRegion,
    /// Failure reported by the 1-D FFT collaborator.
    Fft(FftError),
    /// The worker pool could not be created.
    WorkerPool,
}

impl From<FftError> for AnalyticError {
    fn from(err: FftError) -> Self {
        AnalyticError::Fft(err)
    }
}

impl core::fmt::Display for AnalyticError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AnalyticError::InvalidAxis { axis, dimension } => write!(
                f,
                "axis {} is out of range for a {}-dimensional array",
                axis, dimension
            ),
            AnalyticError::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {} samples, found {}", expected, found)
            }
            AnalyticError::InvalidRegion => {
                f.write_str("requested region lies outside the array")
            }
            AnalyticError::Fft(err) => write!(f, "fft failed: {}", err),
            AnalyticError::WorkerPool => f.write_str("failed to build the worker pool"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AnalyticError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyticError::Fft(err) => Some(err),
            _ => None,
        }
    }
}

/// Fail with [`AnalyticError::InvalidAxis`] unless `axis < dimension`.
pub(crate) fn check_axis(axis: usize, dimension: usize) -> Result<(), AnalyticError> {
    if axis < dimension {
        Ok(())
    } else {
        Err(AnalyticError::InvalidAxis { axis, dimension })
    }
}
