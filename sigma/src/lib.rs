pub mod discrete_distribution;
pub mod gaussian;
pub mod kalman;
pub mod point_set;
pub mod predict_policy;
pub mod quadrature;
pub mod unscented_transform;
pub mod update_policy;

mod error;
pub use error::Error;

pub use discrete_distribution::DiscreteDistribution;
pub use gaussian::{Gaussian, Sampler};
pub use kalman::Kalman;
pub use point_set::{PointSet, Weight};
pub use predict_policy::{ProcessFunction, SigmaPointPredictPolicy};
pub use quadrature::SigmaPointQuadrature;
pub use unscented_transform::{PointSetTransform, UnscentedTransform};
pub use update_policy::{ObservationFunction, SigmaPointUpdatePolicy};

#[cfg(test)]
extern crate lapack_src;

/// How a model's noise enters its output.
#[derive(Clone, Copy, Debug)]
pub enum NoiseCoupling<'a> {
    /// Noise is an argument of the model function and is integrated over
    /// together with the state.
    NonAdditive,
    /// Noise with the given covariance is added to the model output, no
    /// noise points are generated.
    Additive(&'a ndarray::Array2<f64>),
}
