#![allow(non_snake_case)]

use crate::gaussian::Gaussian;
use crate::point_set::{PointSet, Weight};
use crate::Error;

/// Turns a Gaussian into a weighted point set.
pub trait PointSetTransform {
    /// Number of points generated for a Gaussian of dimension `dim`.
    fn number_of_points(&self, dim: usize) -> usize;

    /// Generates the points of `gaussian` embedded into a joint space of
    /// `global_dimension`, where the Gaussian occupies the dimensions starting
    /// at `offset`.
    fn forward_partition(
        &self,
        gaussian: &Gaussian,
        global_dimension: usize,
        offset: usize,
        point_set: &mut PointSet,
    ) -> Result<(), Error>;

    fn forward(&self, gaussian: &Gaussian, point_set: &mut PointSet) -> Result<(), Error> {
        self.forward_partition(gaussian, gaussian.dimension(), 0, point_set)
    }
}

/// Scaled unscented transform.
///
/// alpha: spread of the points around the mean
/// beta: prior knowledge of the distribution, 2 is optimal for gaussians
/// kappa: secondary scaling parameter
///
/// `dim + lambda` must be positive, otherwise weights and points are NaN.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UnscentedTransform {
    pub alpha: f64,
    pub beta: f64,
    pub kappa: f64,
}

impl Default for UnscentedTransform {
    fn default() -> Self {
        Self::new(1.0, 2.0, 0.0)
    }
}

impl UnscentedTransform {
    pub fn new(alpha: f64, beta: f64, kappa: f64) -> Self {
        Self { alpha, beta, kappa }
    }

    pub fn lambda(&self, dim: f64) -> f64 {
        self.alpha.powi(2) * (dim + self.kappa) - dim
    }

    pub fn gamma(&self, dim: f64) -> f64 {
        (dim + self.lambda(dim)).sqrt()
    }

    pub fn weight_mean_0(&self, dim: f64) -> f64 {
        let lambda = self.lambda(dim);
        lambda / (dim + lambda)
    }

    pub fn weight_cov_0(&self, dim: f64) -> f64 {
        self.weight_mean_0(dim) + (1.0 - self.alpha.powi(2) + self.beta)
    }

    pub fn weight_mean_i(&self, dim: f64) -> f64 {
        0.5 / (dim + self.lambda(dim))
    }

    pub fn weight_cov_i(&self, dim: f64) -> f64 {
        self.weight_mean_i(dim)
    }
}

impl PointSetTransform for UnscentedTransform {
    fn number_of_points(&self, dim: usize) -> usize {
        2 * dim + 1
    }

    fn forward_partition(
        &self,
        gaussian: &Gaussian,
        global_dimension: usize,
        offset: usize,
        point_set: &mut PointSet,
    ) -> Result<(), Error> {
        let local_dimension = gaussian.dimension();
        if offset + local_dimension > global_dimension {
            return Err(Error::Sizing {
                expected: global_dimension,
                actual: offset + local_dimension,
            });
        }

        point_set.resize(self.number_of_points(global_dimension))?;
        point_set.set_dimension(local_dimension);

        let dim = global_dimension as f64;
        let sqrt = gaussian.square_root() * self.gamma(dim);
        let mean = gaussian.mean();

        point_set.set_point(
            0,
            mean,
            Weight::new(self.weight_mean_0(dim), self.weight_cov_0(dim)),
        )?;

        let weight_i = Weight::new(self.weight_mean_i(dim), self.weight_cov_i(dim));
        let local = offset + 1..=offset + local_dimension;

        for i in 1..=global_dimension {
            if local.contains(&i) {
                let shift = sqrt.column(i - offset - 1);
                point_set.set_point(i, &(mean + &shift), weight_i)?;
                point_set.set_point(global_dimension + i, &(mean - &shift), weight_i)?;
            } else {
                point_set.set_point(i, mean, weight_i)?;
                point_set.set_point(global_dimension + i, mean, weight_i)?;
            }
        }

        Ok(())
    }
}
