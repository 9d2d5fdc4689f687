//! Square-root factorization of covariance matrices.

use crate::Error;
use ndarray_linalg::cholesky::Cholesky;

/// Returns `(M + Mᵗ) / 2`.
#[allow(non_snake_case)]
pub fn symmetrize<S>(M: &ndarray::ArrayBase<S, ndarray::Ix2>) -> ndarray::Array2<f64>
where
    S: ndarray::Data<Elem = f64>,
{
    (M + &M.t()) * 0.5
}

/// Computes a factor `L` with `L · Lᵗ = cov`.
///
/// Positive definite input yields the lower Cholesky factor. Singular but
/// positive semi-definite input, which Cholesky rejects, falls back to an
/// eigen decomposition, so the factor is not triangular in that case.
pub fn square_root<S>(cov: &ndarray::ArrayBase<S, ndarray::Ix2>) -> Result<ndarray::Array2<f64>, Error>
where
    S: ndarray::Data<Elem = f64>,
{
    if cov.nrows() != cov.ncols() {
        return Err(Error::NotSquare(cov.nrows(), cov.ncols()));
    }
    if cov.is_empty() {
        return Ok(ndarray::Array2::zeros((0, 0)));
    }

    let cov = symmetrize(cov);
    match cov.cholesky(ndarray_linalg::UPLO::Lower) {
        Ok(l) => Ok(l),
        Err(_) => Ok(crate::multivariate::Psd::new(&cov, true)?.sqrt),
    }
}

/// Weighted cross covariance `A · diag(w) · Bᵗ` of two centered point matrices
/// whose columns are points.
#[allow(non_snake_case)]
pub fn weighted_cross_covariance<Sa, Sw, Sb>(
    A: &ndarray::ArrayBase<Sa, ndarray::Ix2>,
    w: &ndarray::ArrayBase<Sw, ndarray::Ix1>,
    B: &ndarray::ArrayBase<Sb, ndarray::Ix2>,
) -> ndarray::Array2<f64>
where
    Sa: ndarray::Data<Elem = f64>,
    Sw: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
{
    assert_eq!(A.ncols(), w.len());
    assert_eq!(B.ncols(), w.len());

    (A * w).dot(&B.t())
}
