use crate::Error;
use ndarray_linalg::eigh::Eigh;

fn check_parameters<Sm, Sc>(
    mean: &ndarray::ArrayBase<Sm, ndarray::Ix1>,
    cov: &ndarray::ArrayBase<Sc, ndarray::Ix2>,
) -> Result<usize, Error>
where
    Sm: ndarray::RawData<Elem = f64>,
    Sc: ndarray::RawData<Elem = f64>,
{
    let dim = mean.len();

    if cov.shape() != [dim, dim] {
        return Err(Error::NotSquare(cov.nrows(), cov.ncols()));
    }

    Ok(dim)
}

/// Eigenvalues below this threshold are treated as zero.
fn eigvalsh_to_eps<S>(spectrum: &ndarray::ArrayBase<S, ndarray::Ix1>) -> f64
where
    S: ndarray::Data<Elem = f64>,
{
    let max = spectrum.iter().fold(0.0f64, |acc, v| v.abs().max(acc));
    1.0e6 * f64::EPSILON * max
}

/// Eigen decomposition of a symmetric positive semi-definite matrix.
///
/// `U` whitens (`Uᵗ M U` is the identity on the range of `M`), `sqrt` is a
/// square-root factor (`sqrt · sqrtᵗ = M`).
#[allow(non_snake_case)]
#[derive(Debug)]
pub struct Psd {
    pub rank: usize,
    pub U: ndarray::Array2<f64>,
    pub sqrt: ndarray::Array2<f64>,
    pub log_pdet: f64,
}

#[allow(non_snake_case)]
impl Psd {
    pub fn new<S>(
        M: &ndarray::ArrayBase<S, ndarray::Ix2>,
        allow_singular: bool,
    ) -> Result<Psd, Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        if M.nrows() != M.ncols() {
            return Err(Error::NotSquare(M.nrows(), M.ncols()));
        }

        let (s, u) = M.eigh(ndarray_linalg::UPLO::Lower)?;
        let eps = eigvalsh_to_eps(&s);

        let s_min = s.iter().fold(f64::MAX, |acc, v| v.min(acc));
        if s_min < -eps {
            return Err(Error::NotPositiveSemiDefinite);
        }

        let rank = s.iter().filter(|v| **v > eps).count();
        if rank < s.len() && !allow_singular {
            return Err(Error::SingularMatrix);
        }

        let s_pinv_sqrt = s.mapv(|v| if v <= eps { 0.0 } else { 1.0 / v.sqrt() });
        let s_sqrt = s.mapv(|v| if v <= eps { 0.0 } else { v.sqrt() });

        Ok(Psd {
            rank,
            U: &u * &s_pinv_sqrt,
            sqrt: &u * &s_sqrt,
            log_pdet: s.iter().filter(|v| **v > eps).map(|v| v.ln()).sum(),
        })
    }

    fn logpdf<Sx, Sm>(
        &self,
        x: &ndarray::ArrayBase<Sx, ndarray::Ix1>,
        mean: &ndarray::ArrayBase<Sm, ndarray::Ix1>,
    ) -> f64
    where
        Sx: ndarray::Data<Elem = f64>,
        Sm: ndarray::Data<Elem = f64>,
    {
        let dev = x - mean;
        let maha = dev.dot(&self.U).mapv(|v| v.powi(2)).sum();
        let log_2pi = (2.0 * std::f64::consts::PI).ln();

        -0.5 * (self.rank as f64 * log_2pi + self.log_pdet + maha)
    }
}

/// Log density of a multivariate normal distribution.
pub fn logpdf<Sx, Sm, Sc>(
    x: &ndarray::ArrayBase<Sx, ndarray::Ix1>,
    mean: &ndarray::ArrayBase<Sm, ndarray::Ix1>,
    cov: &ndarray::ArrayBase<Sc, ndarray::Ix2>,
    allow_singular: bool,
) -> Result<f64, Error>
where
    Sx: ndarray::Data<Elem = f64>,
    Sm: ndarray::Data<Elem = f64>,
    Sc: ndarray::Data<Elem = f64>,
{
    let dim = check_parameters(mean, cov)?;
    if x.len() != dim {
        return Err(Error::WrongVecLen(x.len()));
    }

    let psd = Psd::new(cov, allow_singular)?;
    Ok(psd.logpdf(x, mean))
}
