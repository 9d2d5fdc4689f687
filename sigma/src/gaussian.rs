#![allow(non_snake_case)]

use crate::Error;
use rand_distr::Distribution;

/// Draws a single variate from a distribution.
pub trait Sampler {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> ndarray::Array1<f64>;
}

/// Gaussian belief stored as mean and square-root factor `L` of the
/// covariance, `Σ = L · Lᵗ`.
#[derive(Clone, Debug)]
pub struct Gaussian {
    mean: ndarray::Array1<f64>,
    sqrt: ndarray::Array2<f64>,
}

impl Default for Gaussian {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Gaussian {
    /// Standard normal distribution of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            mean: ndarray::Array1::zeros(dim),
            sqrt: ndarray::Array2::eye(dim),
        }
    }

    pub fn from_moments<Sm, Sc>(
        mean: &ndarray::ArrayBase<Sm, ndarray::Ix1>,
        cov: &ndarray::ArrayBase<Sc, ndarray::Ix2>,
    ) -> Result<Self, Error>
    where
        Sm: ndarray::Data<Elem = f64>,
        Sc: ndarray::Data<Elem = f64>,
    {
        let mut gaussian = Self::new(mean.len());
        gaussian.set_mean(mean)?;
        gaussian.set_covariance(cov)?;
        Ok(gaussian)
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Resets to the standard normal distribution if the dimension changes.
    pub fn set_dimension(&mut self, dim: usize) {
        if dim != self.dimension() {
            *self = Self::new(dim);
        }
    }

    pub fn mean(&self) -> &ndarray::Array1<f64> {
        &self.mean
    }

    pub fn set_mean<S>(&mut self, mean: &ndarray::ArrayBase<S, ndarray::Ix1>) -> Result<(), Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(self.dimension(), mean.len())?;
        self.mean.assign(mean);
        Ok(())
    }

    pub fn covariance(&self) -> ndarray::Array2<f64> {
        self.sqrt.dot(&self.sqrt.t())
    }

    /// Stores the square root of `cov`. Fails if `cov` is not positive
    /// semi-definite.
    pub fn set_covariance<S>(&mut self, cov: &ndarray::ArrayBase<S, ndarray::Ix2>) -> Result<(), Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(self.dimension(), cov.nrows())?;
        Error::check_size(self.dimension(), cov.ncols())?;
        self.sqrt = math::square_root(cov)?;
        Ok(())
    }

    pub fn square_root(&self) -> &ndarray::Array2<f64> {
        &self.sqrt
    }

    pub fn set_square_root<S>(&mut self, L: &ndarray::ArrayBase<S, ndarray::Ix2>) -> Result<(), Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(self.dimension(), L.nrows())?;
        Error::check_size(self.dimension(), L.ncols())?;
        self.sqrt.assign(L);
        Ok(())
    }

    /// Maps a standard normal sample `z` to `μ + L · z`.
    pub fn map_standard_normal<S>(&self, z: &ndarray::ArrayBase<S, ndarray::Ix1>) -> ndarray::Array1<f64>
    where
        S: ndarray::Data<Elem = f64>,
    {
        &self.mean + &self.sqrt.dot(z)
    }

    pub fn log_pdf<S>(&self, x: &ndarray::ArrayBase<S, ndarray::Ix1>) -> Result<f64, Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Ok(math::multivariate::logpdf(
            x,
            &self.mean,
            &self.covariance(),
            true,
        )?)
    }
}

impl Sampler for Gaussian {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> ndarray::Array1<f64> {
        let z = ndarray::Array1::from_shape_fn(self.dimension(), |_| {
            let v: f64 = rand_distr::StandardNormal.sample(&mut *rng);
            v
        });
        self.map_standard_normal(&z)
    }
}
