#![allow(non_snake_case)]

use crate::gaussian::Gaussian;
use crate::point_set::PointSet;
use crate::unscented_transform::{PointSetTransform, UnscentedTransform};
use crate::Error;

/// Numerical integration over the joint space of a state and a noise
/// Gaussian using a deterministic point set.
#[derive(Clone, Debug, Default)]
pub struct SigmaPointQuadrature<T = UnscentedTransform> {
    transform: T,
}

impl<T> SigmaPointQuadrature<T>
where
    T: PointSetTransform,
{
    pub fn new(transform: T) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn number_of_points(&self, dim: usize) -> usize {
        self.transform.number_of_points(dim)
    }

    /// Generates the joint points of `[state, noise]` into `X` and `Y` and
    /// evaluates `f` at every pair into `Z`. All three sets end up with the
    /// same count and point-for-point identical weights.
    pub fn integrate_to_points<F>(
        &self,
        f: F,
        prior: &Gaussian,
        noise: &Gaussian,
        X: &mut PointSet,
        Y: &mut PointSet,
        Z: &mut PointSet,
    ) -> Result<(), Error>
    where
        F: Fn(ndarray::ArrayView1<f64>, ndarray::ArrayView1<f64>) -> ndarray::Array1<f64>,
    {
        let joint_dimension = prior.dimension() + noise.dimension();
        log::trace!(
            "integrating over {} state and {} noise dimensions",
            prior.dimension(),
            noise.dimension()
        );

        self.transform
            .forward_partition(prior, joint_dimension, 0, X)?;
        self.transform
            .forward_partition(noise, joint_dimension, prior.dimension(), Y)?;

        let count = X.count();
        Z.resize(count)?;

        for i in 0..count {
            let z = f(X.point(i), Y.point(i));
            if i == 0 {
                Z.set_dimension(z.len());
            }
            Z.set_point(i, &z, X.weight(i))?;
        }

        Ok(())
    }

    /// Expectation of `f` under the joint distribution of `prior` and `noise`.
    pub fn expectation<F>(
        &self,
        f: F,
        prior: &Gaussian,
        noise: &Gaussian,
    ) -> Result<ndarray::Array1<f64>, Error>
    where
        F: Fn(ndarray::ArrayView1<f64>, ndarray::ArrayView1<f64>) -> ndarray::Array1<f64>,
    {
        let mut X = PointSet::new(prior.dimension(), 0);
        let mut Y = PointSet::new(noise.dimension(), 0);
        let mut Z = PointSet::new(0, 0);

        self.integrate_to_points(f, prior, noise, &mut X, &mut Y, &mut Z)?;
        Ok(Z.mean())
    }
}
