#![allow(non_snake_case)]

use crate::Error;

/// Mean and covariance recombination weight of a single point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Weight {
    pub w_mean: f64,
    pub w_cov: f64,
}

impl Weight {
    pub fn new(w_mean: f64, w_cov: f64) -> Self {
        Self { w_mean, w_cov }
    }
}

/// A set of weighted points. Points are stored as the columns of a
/// `dimension x count` matrix, index 0 is the center point.
#[derive(Clone, Debug)]
pub struct PointSet {
    points: ndarray::Array2<f64>,
    w_mean: ndarray::Array1<f64>,
    w_cov: ndarray::Array1<f64>,

    /// number of points a fixed-size set must always hold
    fixed_count: Option<usize>,
}

impl Default for PointSet {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PointSet {
    /// Creates a set whose point count follows `resize`.
    pub fn new(dim: usize, count: usize) -> Self {
        Self {
            points: ndarray::Array2::zeros((dim, count)),
            w_mean: ndarray::Array1::zeros(count),
            w_cov: ndarray::Array1::zeros(count),
            fixed_count: None,
        }
    }

    /// Creates a set that only ever holds `count` points.
    pub fn fixed(dim: usize, count: usize) -> Self {
        Self {
            fixed_count: Some(count),
            ..Self::new(dim, count)
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_count.is_some()
    }

    pub fn count(&self) -> usize {
        self.points.ncols()
    }

    pub fn dimension(&self) -> usize {
        self.points.nrows()
    }

    /// Changes the number of points. Points that still fit are kept, new ones
    /// are zero with zero weight.
    pub fn resize(&mut self, count: usize) -> Result<(), Error> {
        if let Some(fixed) = self.fixed_count {
            Error::check_size(fixed, count)?;
        }
        if count == self.count() {
            return Ok(());
        }

        let keep = count.min(self.count());
        let mut points = ndarray::Array2::zeros((self.dimension(), count));
        let mut w_mean = ndarray::Array1::zeros(count);
        let mut w_cov = ndarray::Array1::zeros(count);

        points
            .slice_mut(ndarray::s![.., ..keep])
            .assign(&self.points.slice(ndarray::s![.., ..keep]));
        w_mean
            .slice_mut(ndarray::s![..keep])
            .assign(&self.w_mean.slice(ndarray::s![..keep]));
        w_cov
            .slice_mut(ndarray::s![..keep])
            .assign(&self.w_cov.slice(ndarray::s![..keep]));

        self.points = points;
        self.w_mean = w_mean;
        self.w_cov = w_cov;

        Ok(())
    }

    /// Changes the dimension of the points. All points are reset to zero,
    /// weights are kept.
    pub fn set_dimension(&mut self, dim: usize) {
        if dim != self.dimension() {
            self.points = ndarray::Array2::zeros((dim, self.count()));
        }
    }

    pub fn set_point<S>(
        &mut self,
        i: usize,
        value: &ndarray::ArrayBase<S, ndarray::Ix1>,
        weight: Weight,
    ) -> Result<(), Error>
    where
        S: ndarray::Data<Elem = f64>,
    {
        Error::check_size(self.dimension(), value.len())?;

        self.points.column_mut(i).assign(value);
        self.w_mean[i] = weight.w_mean;
        self.w_cov[i] = weight.w_cov;

        Ok(())
    }

    pub fn point(&self, i: usize) -> ndarray::ArrayView1<f64> {
        self.points.column(i)
    }

    pub fn weight(&self, i: usize) -> Weight {
        Weight::new(self.w_mean[i], self.w_cov[i])
    }

    pub fn points(&self) -> &ndarray::Array2<f64> {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut ndarray::Array2<f64> {
        &mut self.points
    }

    pub fn mean_weights_vector(&self) -> &ndarray::Array1<f64> {
        &self.w_mean
    }

    pub fn covariance_weights_vector(&self) -> &ndarray::Array1<f64> {
        &self.w_cov
    }

    /// Weighted mean of all points.
    pub fn mean(&self) -> ndarray::Array1<f64> {
        self.points.dot(&self.w_mean)
    }

    /// Alias of [`PointSet::mean`].
    pub fn center(&self) -> ndarray::Array1<f64> {
        self.mean()
    }

    /// Points with the weighted mean subtracted from each column.
    pub fn centered_points(&self) -> ndarray::Array2<f64> {
        let mean = self.mean().insert_axis(ndarray::Axis(1));
        &self.points - &mean
    }

    /// Covariance of the points, `Xc · diag(w_cov) · Xcᵗ`.
    pub fn covariance(&self) -> ndarray::Array2<f64> {
        let Xc = self.centered_points();
        math::weighted_cross_covariance(&Xc, &self.w_cov, &Xc)
    }
}
