use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::azip;

pub fn assert_arr1_eq<Sa, Sb>(
    a: &ndarray::ArrayBase<Sa, ndarray::Ix1>,
    b: &ndarray::ArrayBase<Sb, ndarray::Ix1>,
) where
    Sa: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
{
    assert_eq!(a.dim(), b.dim());

    azip!((a in a, b in b) assert_abs_diff_eq!(a, b, epsilon=1.0e-6));
}

pub fn assert_arr2_eq<Sa, Sb>(
    a: &ndarray::ArrayBase<Sa, ndarray::Ix2>,
    b: &ndarray::ArrayBase<Sb, ndarray::Ix2>,
) where
    Sa: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
{
    assert_eq!(a.dim(), b.dim());

    azip!((a in a.columns(), b in b.columns()) assert_arr1_eq(&a, &b));
}

/// Element-wise comparison relative to the largest magnitude in `b`. Below a
/// magnitude of 1 the tolerance is absolute.
pub fn assert_arr2_relative_eq<Sa, Sb>(
    a: &ndarray::ArrayBase<Sa, ndarray::Ix2>,
    b: &ndarray::ArrayBase<Sb, ndarray::Ix2>,
    max_relative: f64,
) where
    Sa: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
{
    assert_eq!(a.dim(), b.dim());

    let scale = b.fold(0.0f64, |acc, v| acc.max(v.abs())).max(1.0);
    azip!((a in a, b in b) assert_relative_eq!(a / scale, b / scale, epsilon = max_relative, max_relative = max_relative));
}

pub fn assert_arr1_relative_eq<Sa, Sb>(
    a: &ndarray::ArrayBase<Sa, ndarray::Ix1>,
    b: &ndarray::ArrayBase<Sb, ndarray::Ix1>,
    max_relative: f64,
) where
    Sa: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
{
    assert_eq!(a.dim(), b.dim());

    let scale = b.fold(0.0f64, |acc, v| acc.max(v.abs())).max(1.0);
    azip!((a in a, b in b) assert_relative_eq!(a / scale, b / scale, epsilon = max_relative, max_relative = max_relative));
}
