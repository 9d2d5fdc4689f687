#![allow(non_snake_case)]

use crate::gaussian::Gaussian;
use crate::point_set::PointSet;
use crate::quadrature::SigmaPointQuadrature;
use crate::unscented_transform::PointSetTransform;
use crate::{Error, NoiseCoupling};
use ndarray_linalg::solve::Inverse;

/// Observation model `y = h(x, w)`.
pub trait ObservationFunction {
    fn obsrv_dimension(&self) -> usize;

    /// Dimension of the standard normal noise `w`. Ignored for additive
    /// coupling.
    fn noise_dimension(&self) -> usize;

    fn observation(
        &self,
        state: ndarray::ArrayView1<f64>,
        noise: ndarray::ArrayView1<f64>,
    ) -> ndarray::Array1<f64>;

    fn noise_coupling(&self) -> NoiseCoupling<'_> {
        NoiseCoupling::NonAdditive
    }
}

/// Measurement update through sigma-point quadrature.
///
/// The point sets are scratch space that every call overwrites, so an
/// instance must not be shared between concurrent updates.
#[derive(Clone, Debug, Default)]
pub struct SigmaPointUpdatePolicy {
    X: PointSet,
    Y: PointSet,
    Z: PointSet,
    noise: Gaussian,

    /// innovation of the last update
    pub y: ndarray::Array1<f64>,
    /// innovation covariance of the last update
    pub S: ndarray::Array2<f64>,
}

impl SigmaPointUpdatePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<H, T, S>(
        &mut self,
        obsrv_fn: &H,
        quadrature: &SigmaPointQuadrature<T>,
        prior: &Gaussian,
        obsrv: &ndarray::ArrayBase<S, ndarray::Ix1>,
    ) -> Result<Gaussian, Error>
    where
        H: ObservationFunction + ?Sized,
        T: PointSetTransform,
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(obsrv_fn.obsrv_dimension(), obsrv.len())?;

        let R = match obsrv_fn.noise_coupling() {
            NoiseCoupling::NonAdditive => {
                self.noise.set_dimension(obsrv_fn.noise_dimension());
                None
            }
            NoiseCoupling::Additive(R) => {
                Error::check_size(obsrv.len(), R.nrows())?;
                Error::check_size(obsrv.len(), R.ncols())?;
                self.noise.set_dimension(0);
                Some(R)
            }
        };

        quadrature.integrate_to_points(
            |x, w| obsrv_fn.observation(x, w),
            prior,
            &self.noise,
            &mut self.X,
            &mut self.Y,
            &mut self.Z,
        )?;
        Error::check_size(obsrv.len(), self.Z.dimension())?;

        let prediction = self.Z.center();
        let innovation = obsrv - &prediction;

        let W = self.X.covariance_weights_vector();
        let Xc = self.X.centered_points();
        let Zc = self.Z.centered_points();

        let cov_xx = math::weighted_cross_covariance(&Xc, W, &Xc);
        let mut cov_zz = math::weighted_cross_covariance(&Zc, W, &Zc);
        let cov_xz = math::weighted_cross_covariance(&Xc, W, &Zc);
        if let Some(R) = R {
            cov_zz += R;
        }

        // Kalman gain
        let K = cov_xz.dot(&cov_zz.inv()?);

        let mut posterior = Gaussian::new(prior.dimension());
        posterior.set_mean(&(self.X.mean() + K.dot(&innovation)))?;
        posterior.set_covariance(&(cov_xx - K.dot(&cov_zz).dot(&K.t())))?;

        self.y = innovation;
        self.S = cov_zz;

        Ok(posterior)
    }

    /// Like [`SigmaPointUpdatePolicy::update`], with the posterior replacing
    /// `belief`. On error `belief` is left untouched.
    pub fn update_in_place<H, T, S>(
        &mut self,
        obsrv_fn: &H,
        quadrature: &SigmaPointQuadrature<T>,
        belief: &mut Gaussian,
        obsrv: &ndarray::ArrayBase<S, ndarray::Ix1>,
    ) -> Result<(), Error>
    where
        H: ObservationFunction + ?Sized,
        T: PointSetTransform,
        S: ndarray::Data<Elem = f64>,
    {
        *belief = self.update(obsrv_fn, quadrature, belief, obsrv)?;
        Ok(())
    }

    /// log-likelihood of the last measurement
    pub fn log_likelihood(&self) -> Result<f64, Error> {
        let mean = ndarray::Array1::zeros(self.y.len());
        Ok(math::multivariate::logpdf(&self.y, &mean, &self.S, true)?)
    }

    /// Computed from the log-likelihood, never smaller than
    /// `f64::MIN_POSITIVE` so it can be used as a multiplier.
    pub fn likelihood(&self) -> Result<f64, Error> {
        let l = self.log_likelihood()?.exp();
        Ok(if l == 0.0 { f64::MIN_POSITIVE } else { l })
    }

    pub fn state_points(&self) -> &PointSet {
        &self.X
    }

    pub fn noise_points(&self) -> &PointSet {
        &self.Y
    }

    pub fn obsrv_points(&self) -> &PointSet {
        &self.Z
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::kalman::Kalman;
    use crate::predict_policy::tests::LinearProcess;
    use crate::predict_policy::SigmaPointPredictPolicy;
    use crate::unscented_transform::tests::{random_covariance, random_gaussian};
    use crate::unscented_transform::UnscentedTransform;
    use ndarray::array;
    use ndarray_linalg::cholesky::Cholesky;
    use rand::{Rng, SeedableRng};

    extern crate lapack_src;

    /// `y = H x + sqrt(R) w`
    pub struct LinearObservation {
        pub H: ndarray::Array2<f64>,
        pub R_sqrt: ndarray::Array2<f64>,
    }

    impl LinearObservation {
        pub fn new(H: ndarray::Array2<f64>, R: &ndarray::Array2<f64>) -> Self {
            Self {
                H,
                R_sqrt: math::square_root(R).unwrap(),
            }
        }
    }

    impl ObservationFunction for LinearObservation {
        fn obsrv_dimension(&self) -> usize {
            self.H.nrows()
        }

        fn noise_dimension(&self) -> usize {
            self.R_sqrt.ncols()
        }

        fn observation(
            &self,
            state: ndarray::ArrayView1<f64>,
            noise: ndarray::ArrayView1<f64>,
        ) -> ndarray::Array1<f64> {
            self.H.dot(&state) + self.R_sqrt.dot(&noise)
        }
    }

    /// `y = H x + v` with `v ~ N(0, R)`
    struct AdditiveLinearObservation {
        H: ndarray::Array2<f64>,
        R: ndarray::Array2<f64>,
    }

    impl ObservationFunction for AdditiveLinearObservation {
        fn obsrv_dimension(&self) -> usize {
            self.H.nrows()
        }

        fn noise_dimension(&self) -> usize {
            self.R.nrows()
        }

        fn observation(
            &self,
            state: ndarray::ArrayView1<f64>,
            _noise: ndarray::ArrayView1<f64>,
        ) -> ndarray::Array1<f64> {
            self.H.dot(&state)
        }

        fn noise_coupling(&self) -> NoiseCoupling<'_> {
            NoiseCoupling::Additive(&self.R)
        }
    }

    /// range and bearing of a planar position
    struct RangeBearing;

    impl ObservationFunction for RangeBearing {
        fn obsrv_dimension(&self) -> usize {
            2
        }

        fn noise_dimension(&self) -> usize {
            2
        }

        fn observation(
            &self,
            state: ndarray::ArrayView1<f64>,
            noise: ndarray::ArrayView1<f64>,
        ) -> ndarray::Array1<f64> {
            array![
                state[0].hypot(state[1]) + 0.1 * noise[0],
                state[1].atan2(state[0]) + 0.01 * noise[1]
            ]
        }
    }

    fn kalman_reference(
        prior: &Gaussian,
        H: &ndarray::Array2<f64>,
        R: &ndarray::Array2<f64>,
        z: &ndarray::Array1<f64>,
    ) -> Gaussian {
        let mut kf = Kalman::new(prior.dimension(), z.len());
        kf.H.assign(H);
        kf.R.assign(R);
        kf.update(prior, z).unwrap()
    }

    #[test]
    fn linear_update() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let prior = random_gaussian(&mut rng, 4);
        let H = ndarray::Array2::from_shape_fn((2, 4), |_| rng.gen_range(-1.0f64..1.0));
        let R = random_covariance(&mut rng, 2);
        let z = array![0.3, -1.2];

        let quadrature = SigmaPointQuadrature::new(UnscentedTransform::new(0.7, 2.0, 0.5));
        let mut policy = SigmaPointUpdatePolicy::new();
        let posterior = policy
            .update(&LinearObservation::new(H.clone(), &R), &quadrature, &prior, &z)
            .unwrap();

        let expected = kalman_reference(&prior, &H, &R, &z);
        testlib::assert_arr1_eq(posterior.mean(), expected.mean());
        testlib::assert_arr2_eq(&posterior.covariance(), &expected.covariance());

        testlib::assert_arr1_eq(&policy.y, &(&z - &H.dot(prior.mean())));
        testlib::assert_arr2_eq(
            &policy.S,
            &(H.dot(&prior.covariance()).dot(&H.t()) + &R),
        );
        assert_eq!(policy.state_points().count(), 13);
        assert_eq!(policy.noise_points().dimension(), 2);
        assert_eq!(policy.obsrv_points().dimension(), 2);
    }

    #[test]
    fn additive_matches_non_additive() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let prior = random_gaussian(&mut rng, 3);
        let H = ndarray::Array2::from_shape_fn((2, 3), |_| rng.gen_range(-1.0f64..1.0));
        let R = random_covariance(&mut rng, 2);
        let z = array![1.0, 2.0];
        let quadrature: SigmaPointQuadrature = SigmaPointQuadrature::default();

        let mut policy = SigmaPointUpdatePolicy::new();
        let a = policy
            .update(&LinearObservation::new(H.clone(), &R), &quadrature, &prior, &z)
            .unwrap();
        let ll_a = policy.log_likelihood().unwrap();

        let b = policy
            .update(
                &AdditiveLinearObservation { H, R },
                &quadrature,
                &prior,
                &z,
            )
            .unwrap();
        let ll_b = policy.log_likelihood().unwrap();

        // the additive update integrates over the state dimensions only
        assert_eq!(policy.state_points().count(), 7);
        testlib::assert_arr1_eq(a.mean(), b.mean());
        testlib::assert_arr2_eq(&a.covariance(), &b.covariance());
        approx::assert_abs_diff_eq!(ll_a, ll_b, epsilon = 1.0e-9);
        assert!(policy.likelihood().unwrap() > 0.0);
    }

    #[test]
    fn nonlinear_update() {
        let prior = Gaussian::from_moments(
            &array![10.0, 10.0],
            &array![[1.0, 0.0], [0.0, 1.0]],
        )
        .unwrap();
        let truth = array![10.5f64, 9.5];
        let z = array![truth[0].hypot(truth[1]), truth[1].atan2(truth[0])];

        let quadrature: SigmaPointQuadrature = SigmaPointQuadrature::default();
        let mut policy = SigmaPointUpdatePolicy::new();
        let mut belief = prior.clone();
        policy
            .update_in_place(&RangeBearing, &quadrature, &mut belief, &z)
            .unwrap();

        let error_prior = (prior.mean() - &truth).mapv(|v| v.powi(2)).sum();
        let error_posterior = (belief.mean() - &truth).mapv(|v| v.powi(2)).sum();
        assert!(error_posterior < 0.1 * error_prior);
        assert!(belief.covariance().diag().iter().all(|v| *v < 1.0));
        assert!(belief.covariance().cholesky(ndarray_linalg::UPLO::Lower).is_ok());
    }

    #[test]
    fn wrong_observation_size() {
        let quadrature: SigmaPointQuadrature = SigmaPointQuadrature::default();
        let obsrv_fn = LinearObservation::new(ndarray::Array2::eye(2), &ndarray::Array2::eye(2));
        let mut policy = SigmaPointUpdatePolicy::new();

        assert!(matches!(
            policy.update(&obsrv_fn, &quadrature, &Gaussian::new(2), &array![1.0, 2.0, 3.0]),
            Err(Error::Sizing {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn singular_innovation_covariance() {
        let quadrature: SigmaPointQuadrature = SigmaPointQuadrature::default();
        // the observation does not depend on the state and carries no noise
        let obsrv_fn = LinearObservation {
            H: ndarray::Array2::zeros((1, 2)),
            R_sqrt: ndarray::Array2::zeros((1, 1)),
        };
        let mut policy = SigmaPointUpdatePolicy::new();
        let mut belief = Gaussian::new(2);

        assert!(matches!(
            policy.update_in_place(&obsrv_fn, &quadrature, &mut belief, &array![1.0]),
            Err(Error::Linalg(_))
        ));
        testlib::assert_arr2_eq(&belief.covariance(), &ndarray::Array2::eye(2));
    }

    const DIM_STATE_A: usize = 7;
    const DIM_STATE_B: usize = 3;
    const COUNT_STATE_B: usize = 5;
    const DIM_OBSRV: usize = 1;
    const DIM_JOINT_STATE: usize = DIM_STATE_A + DIM_STATE_B * COUNT_STATE_B;
    const DIM_JOINT_OBSRV: usize = DIM_OBSRV * COUNT_STATE_B;

    const COEFF_A: f64 = 0.5465454;
    const COEFF_Q: f64 = 0.06;
    const COEFF_R: f64 = 0.05;

    /// Sensor matrix of partitions that all observe the shared state `a`
    /// plus their own state `b`.
    fn factorized_sensor_matrix<R: Rng>(rng: &mut R) -> ndarray::Array2<f64> {
        let H_a = ndarray::Array2::from_shape_fn((DIM_OBSRV, DIM_STATE_A), |_| {
            rng.gen_range(-1.0f64..1.0)
        });
        let H_b = ndarray::Array2::from_shape_fn((DIM_OBSRV, DIM_STATE_B), |_| {
            rng.gen_range(-1.0f64..1.0)
        });

        let mut H = ndarray::Array2::<f64>::zeros((DIM_JOINT_OBSRV, DIM_JOINT_STATE));
        for i in 0..COUNT_STATE_B {
            let rows = i * DIM_OBSRV..(i + 1) * DIM_OBSRV;
            let cols_b = DIM_STATE_A + i * DIM_STATE_B..DIM_STATE_A + (i + 1) * DIM_STATE_B;

            H.slice_mut(ndarray::s![rows.clone(), ..DIM_STATE_A])
                .assign(&H_a);
            H.slice_mut(ndarray::s![rows, cols_b]).assign(&H_b);
        }
        H
    }

    #[test]
    fn linear_gaussian_equivalence() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(2014);

        let F = ndarray::Array2::<f64>::eye(DIM_JOINT_STATE) * COEFF_A;
        let Q = ndarray::Array2::<f64>::eye(DIM_JOINT_STATE) * COEFF_Q;
        let R = ndarray::Array2::<f64>::eye(DIM_JOINT_OBSRV) * COEFF_R;

        let mut kf = Kalman::new(DIM_JOINT_STATE, DIM_JOINT_OBSRV);
        kf.F.assign(&F);
        kf.Q.assign(&Q);
        kf.R.assign(&R);

        let process = LinearProcess::new(F, &Q);
        let quadrature: SigmaPointQuadrature = SigmaPointQuadrature::default();
        let mut predict_policy = SigmaPointPredictPolicy::new();
        let mut update_policy = SigmaPointUpdatePolicy::new();

        let mut kf_belief = Gaussian::new(DIM_JOINT_STATE);
        let mut sp_belief = Gaussian::new(DIM_JOINT_STATE);

        for _ in 0..20000 {
            let y = ndarray::Array1::from_shape_fn(DIM_JOINT_OBSRV, |_| {
                rng.gen_range(-1.0f64..1.0)
            });
            let H = factorized_sensor_matrix(&mut rng);
            kf.H.assign(&H);
            let obsrv_fn = LinearObservation::new(H, &R);

            kf_belief = kf.predict(&kf_belief).unwrap();
            predict_policy
                .predict_in_place(&process, &quadrature, &mut sp_belief)
                .unwrap();

            assert!(sp_belief.covariance().cholesky(ndarray_linalg::UPLO::Lower).is_ok());
            testlib::assert_arr1_relative_eq(sp_belief.mean(), kf_belief.mean(), 1.0e-6);
            testlib::assert_arr2_relative_eq(
                &sp_belief.covariance(),
                &kf_belief.covariance(),
                1.0e-6,
            );

            kf_belief = kf.update(&kf_belief, &y).unwrap();
            update_policy
                .update_in_place(&obsrv_fn, &quadrature, &mut sp_belief, &y)
                .unwrap();

            assert!(kf_belief.covariance().cholesky(ndarray_linalg::UPLO::Lower).is_ok());
            assert!(sp_belief.covariance().cholesky(ndarray_linalg::UPLO::Lower).is_ok());
            testlib::assert_arr1_relative_eq(sp_belief.mean(), kf_belief.mean(), 1.0e-6);
            testlib::assert_arr2_relative_eq(
                &sp_belief.covariance(),
                &kf_belief.covariance(),
                1.0e-6,
            );
        }
    }
}
