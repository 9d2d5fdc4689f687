#![allow(non_snake_case)]

use crate::gaussian::Gaussian;
use crate::point_set::PointSet;
use crate::quadrature::SigmaPointQuadrature;
use crate::unscented_transform::PointSetTransform;
use crate::{Error, NoiseCoupling};

/// Process model `x' = f(x, w)`.
pub trait ProcessFunction {
    fn state_dimension(&self) -> usize;

    /// Dimension of the standard normal noise `w`. Ignored for additive
    /// coupling.
    fn noise_dimension(&self) -> usize;

    fn predict_state(
        &self,
        state: ndarray::ArrayView1<f64>,
        noise: ndarray::ArrayView1<f64>,
    ) -> ndarray::Array1<f64>;

    fn noise_coupling(&self) -> NoiseCoupling<'_> {
        NoiseCoupling::NonAdditive
    }
}

/// Time update through sigma-point quadrature. Like the update policy, the
/// point sets are per-instance scratch space.
#[derive(Clone, Debug, Default)]
pub struct SigmaPointPredictPolicy {
    X: PointSet,
    Y: PointSet,
    Z: PointSet,
    noise: Gaussian,
}

impl SigmaPointPredictPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predict<F, T>(
        &mut self,
        process_fn: &F,
        quadrature: &SigmaPointQuadrature<T>,
        prior: &Gaussian,
    ) -> Result<Gaussian, Error>
    where
        F: ProcessFunction + ?Sized,
        T: PointSetTransform,
    {
        let dim = process_fn.state_dimension();
        Error::check_size(dim, prior.dimension())?;

        let Q = match process_fn.noise_coupling() {
            NoiseCoupling::NonAdditive => {
                self.noise.set_dimension(process_fn.noise_dimension());
                None
            }
            NoiseCoupling::Additive(Q) => {
                Error::check_size(dim, Q.nrows())?;
                Error::check_size(dim, Q.ncols())?;
                self.noise.set_dimension(0);
                Some(Q)
            }
        };

        // pass the joint sigma points through the process function
        quadrature.integrate_to_points(
            |x, w| process_fn.predict_state(x, w),
            prior,
            &self.noise,
            &mut self.X,
            &mut self.Y,
            &mut self.Z,
        )?;
        Error::check_size(dim, self.Z.dimension())?;

        let mut cov = self.Z.covariance();
        if let Some(Q) = Q {
            cov += Q;
        }

        let mut predicted = Gaussian::new(dim);
        predicted.set_mean(&self.Z.mean())?;
        predicted.set_covariance(&cov)?;

        Ok(predicted)
    }

    pub fn predict_in_place<F, T>(
        &mut self,
        process_fn: &F,
        quadrature: &SigmaPointQuadrature<T>,
        belief: &mut Gaussian,
    ) -> Result<(), Error>
    where
        F: ProcessFunction + ?Sized,
        T: PointSetTransform,
    {
        *belief = self.predict(process_fn, quadrature, belief)?;
        Ok(())
    }

    /// Predicted points of the last call.
    pub fn predicted_points(&self) -> &PointSet {
        &self.Z
    }
}
