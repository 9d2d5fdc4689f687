#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Math(#[from] math::Error),
    #[error("numerical failure: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),

    #[error("incompatible size: expected {expected}, got {actual}")]
    Sizing { expected: usize, actual: usize },
    #[error("distribution needs at least one location")]
    EmptySupport,
}

impl Error {
    pub(crate) fn check_size(expected: usize, actual: usize) -> Result<(), Error> {
        if expected != actual {
            return Err(Error::Sizing { expected, actual });
        }
        Ok(())
    }
}
