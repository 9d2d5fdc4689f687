use crate::gaussian::Sampler;
use crate::Error;

/// Weighted set of locations, sampled through an inverse-CDF lookup.
///
/// `prob_mass` and `cumulative` are derived from `log_prob_mass` and are
/// rebuilt together whenever the mass changes.
#[derive(Clone, Debug)]
pub struct DiscreteDistribution {
    dim: usize,
    locations: Vec<ndarray::Array1<f64>>,
    log_prob_mass: ndarray::Array1<f64>,
    prob_mass: ndarray::Array1<f64>,
    cumulative: ndarray::Array1<f64>,
}

impl DiscreteDistribution {
    /// A single zero location holding all the mass.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            locations: vec![ndarray::Array1::zeros(dim)],
            log_prob_mass: ndarray::Array1::zeros(1),
            prob_mass: ndarray::Array1::ones(1),
            cumulative: ndarray::Array1::ones(1),
        }
    }

    /// `size` zero locations with uniform mass.
    pub fn with_size(dim: usize, size: usize) -> Result<Self, Error> {
        let mut dist = Self::new(dim);
        dist.set_uniform(size)?;
        Ok(dist)
    }

    /// Normalizes `log_mass` and takes it as the new mass. The number of
    /// locations follows its length, added locations are zero and must be
    /// assigned by the caller.
    pub fn set_log_unnormalized_prob_mass<S>(
        &mut self,
        log_mass: &ndarray::ArrayBase<S, ndarray::Ix1>,
    ) -> Result<(), Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        if log_mass.is_empty() {
            return Err(Error::EmptySupport);
        }

        let max = log_mass.fold(f64::NEG_INFINITY, |acc, v| acc.max(*v));
        let mut log_prob_mass = log_mass - max;
        let mut prob_mass = log_prob_mass.mapv(f64::exp);

        let sum = prob_mass.sum();
        prob_mass /= sum;
        log_prob_mass -= sum.ln();

        let cumulative: ndarray::Array1<f64> = prob_mass
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect();

        if log_mass.len() != self.locations.len() {
            log::debug!(
                "resizing discrete distribution from {} to {} locations",
                self.locations.len(),
                log_mass.len()
            );
            self.locations
                .resize(log_mass.len(), ndarray::Array1::zeros(self.dim));
        }

        self.log_prob_mass = log_prob_mass;
        self.prob_mass = prob_mass;
        self.cumulative = cumulative;

        Ok(())
    }

    pub fn set_uniform(&mut self, size: usize) -> Result<(), Error> {
        self.set_log_unnormalized_prob_mass(&ndarray::Array1::<f64>::zeros(size))
    }

    /// Multiplies the mass by `exp(delta)` and renormalizes.
    pub fn add_log_prob_mass_delta<S>(
        &mut self,
        delta: &ndarray::ArrayBase<S, ndarray::Ix1>,
    ) -> Result<(), Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(self.size(), delta.len())?;

        let log_mass = &self.log_prob_mass + delta;
        self.set_log_unnormalized_prob_mass(&log_mass)
    }

    /// Replaces the locations by `size` draws from `dist`, each with the same
    /// mass.
    pub fn populate_from<D, R>(&mut self, dist: &D, rng: &mut R, size: usize) -> Result<(), Error>
    where
        D: Sampler + ?Sized,
        R: rand::Rng + ?Sized,
    {
        let samples = draw(dist, rng, size);
        self.take_samples(samples)
    }

    /// [`DiscreteDistribution::populate_from`] with this distribution as the
    /// source. All draws are taken before anything is overwritten.
    pub fn resample<R>(&mut self, rng: &mut R, size: usize) -> Result<(), Error>
    where
        R: rand::Rng + ?Sized,
    {
        let samples = draw(&*self, rng, size);
        self.take_samples(samples)
    }

    fn take_samples(&mut self, samples: Vec<ndarray::Array1<f64>>) -> Result<(), Error> {
        for sample in &samples {
            Error::check_size(self.dim, sample.len())?;
        }

        self.set_uniform(samples.len())?;
        self.locations = samples;

        Ok(())
    }

    /// Location at the smallest index whose cumulative mass reaches `u`.
    pub fn map_standard_uniform(&self, u: f64) -> &ndarray::Array1<f64> {
        let i = match self.cumulative.iter().position(|&c| c >= u) {
            Some(i) => i,
            None => {
                let last = self.locations.len() - 1;
                log::debug!(
                    "u = {} beyond cumulative mass {}, clamping to the last location",
                    u,
                    self.cumulative[last]
                );
                last
            }
        };

        &self.locations[i]
    }

    pub fn map_standard_normal(&self, z: f64) -> &ndarray::Array1<f64> {
        self.map_standard_uniform(math::normal_cdf(z))
    }

    pub fn location(&self, i: usize) -> &ndarray::Array1<f64> {
        &self.locations[i]
    }

    pub fn location_mut(&mut self, i: usize) -> &mut ndarray::Array1<f64> {
        &mut self.locations[i]
    }

    pub fn locations(&self) -> &[ndarray::Array1<f64>] {
        &self.locations
    }

    pub fn locations_mut(&mut self) -> &mut [ndarray::Array1<f64>] {
        &mut self.locations
    }

    pub fn log_prob_mass(&self, i: usize) -> f64 {
        self.log_prob_mass[i]
    }

    pub fn log_prob_masses(&self) -> &ndarray::Array1<f64> {
        &self.log_prob_mass
    }

    pub fn prob_mass(&self, i: usize) -> f64 {
        self.prob_mass[i]
    }

    pub fn prob_masses(&self) -> &ndarray::Array1<f64> {
        &self.prob_mass
    }

    pub fn cumulative(&self) -> &ndarray::Array1<f64> {
        &self.cumulative
    }

    pub fn size(&self) -> usize {
        self.locations.len()
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn mean(&self) -> ndarray::Array1<f64> {
        let mut mean = ndarray::Array1::zeros(self.dim);
        for (location, p) in self.locations.iter().zip(self.prob_mass.iter()) {
            mean.scaled_add(*p, location);
        }
        mean
    }

    pub fn covariance(&self) -> ndarray::Array2<f64> {
        let mean = self.mean();
        let mut cov = ndarray::Array2::zeros((self.dim, self.dim));
        for (location, p) in self.locations.iter().zip(self.prob_mass.iter()) {
            let d = location - &mean;
            cov.scaled_add(*p, &math::outer_product(&d, &d));
        }
        cov
    }

    /// Shannon entropy of the mass in nats.
    pub fn entropy(&self) -> f64 {
        -self
            .prob_mass
            .iter()
            .zip(self.log_prob_mass.iter())
            .map(|(p, log_p)| p * log_p)
            .sum::<f64>()
    }

    /// KL divergence from the uniform distribution over the same support.
    pub fn kl_given_uniform(&self) -> f64 {
        (self.size() as f64).ln() - self.entropy()
    }
}

impl Sampler for DiscreteDistribution {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> ndarray::Array1<f64> {
        self.map_standard_uniform(rng.gen::<f64>()).clone()
    }
}

fn draw<D, R>(dist: &D, rng: &mut R, size: usize) -> Vec<ndarray::Array1<f64>>
where
    D: Sampler + ?Sized,
    R: rand::Rng + ?Sized,
{
    (0..size).map(|_| dist.sample(&mut *rng)).collect()
}
