/// SVD errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvdError
{
    /// Empty matrix (no rows or no columns).
    EmptyMat,
    /// Matrix contains NaN or infinity.
    NonFinite,
    /// Exceed max sweeps.
    ExcessSweep,
    /// All singular values are zero.
    ZeroMat,
}

impl core::fmt::Display for SvdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            SvdError::EmptyMat    => "EmptyMat: matrix has no rows or no columns",
            SvdError::NonFinite   => "NonFinite: matrix contains NaN or infinity",
            SvdError::ExcessSweep => "ExcessSweep: exceed max Jacobi sweeps",
            SvdError::ZeroMat     => "ZeroMat: all singular values are zero",
        })
    }
}

impl std::error::Error for SvdError {}
