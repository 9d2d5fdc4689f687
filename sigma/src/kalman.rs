#![allow(non_snake_case)]

use crate::gaussian::Gaussian;
use crate::Error;
use ndarray_linalg::solve::Inverse;

/// Closed-form predict and update of a linear Gaussian model,
/// `x' = F x + q` and `z = H x + r` with `q ~ N(0, Q)`, `r ~ N(0, R)`.
#[derive(Clone, Debug)]
pub struct Kalman {
    dim_x: usize,
    pub F: ndarray::Array2<f64>,
    pub Q: ndarray::Array2<f64>,
    pub H: ndarray::Array2<f64>,
    pub R: ndarray::Array2<f64>,
    pub y: ndarray::Array1<f64>,
    pub S: ndarray::Array2<f64>,
}

impl Kalman {
    pub fn new(dim_x: usize, dim_z: usize) -> Self {
        Self {
            dim_x,
            F: ndarray::Array2::eye(dim_x),
            Q: ndarray::Array2::eye(dim_x),
            H: ndarray::Array2::zeros((dim_z, dim_x)),
            R: ndarray::Array2::eye(dim_z),
            y: ndarray::Array1::zeros(dim_z),
            S: ndarray::Array2::zeros((dim_z, dim_z)),
        }
    }

    pub fn predict(&self, belief: &Gaussian) -> Result<Gaussian, Error> {
        Error::check_size(self.dim_x, belief.dimension())?;

        let P = belief.covariance();
        let mut predicted = Gaussian::new(self.dim_x);
        predicted.set_mean(&self.F.dot(belief.mean()))?;
        predicted.set_covariance(&(self.F.dot(&P).dot(&self.F.t()) + &self.Q))?;
        Ok(predicted)
    }

    pub fn update<S>(
        &mut self,
        belief: &Gaussian,
        z: &ndarray::ArrayBase<S, ndarray::Ix1>,
    ) -> Result<Gaussian, Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(self.dim_x, belief.dimension())?;
        Error::check_size(self.H.nrows(), z.len())?;

        let P = belief.covariance();
        let y = z - &self.H.dot(belief.mean());
        let PHT = P.dot(&self.H.t());
        let S = self.H.dot(&PHT) + &self.R;
        let K = PHT.dot(&S.inv()?);

        // Joseph form keeps P symmetric positive semi-definite
        let I_KH = ndarray::Array2::<f64>::eye(self.dim_x) - K.dot(&self.H);
        let P = I_KH.dot(&P).dot(&I_KH.t()) + K.dot(&self.R).dot(&K.t());

        let mut posterior = Gaussian::new(self.dim_x);
        posterior.set_mean(&(belief.mean() + &K.dot(&y)))?;
        posterior.set_covariance(&P)?;

        self.y = y;
        self.S = S;

        Ok(posterior)
    }

    /// log-likelihood of the last measurement
    pub fn log_likelihood(&self) -> Result<f64, Error> {
        let mean = ndarray::Array1::zeros(self.y.len());
        Ok(math::multivariate::logpdf(&self.y, &mean, &self.S, true)?)
    }
}
