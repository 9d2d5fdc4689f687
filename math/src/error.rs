#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Linalg(#[from] ndarray_linalg::error::LinalgError),

    #[error("not positive semi-definite")]
    NotPositiveSemiDefinite,
    #[error("not square: {0}x{1}")]
    NotSquare(usize, usize),
    #[error("singular matrix")]
    SingularMatrix,
    #[error("wrong vec len {0}")]
    WrongVecLen(usize),
}
