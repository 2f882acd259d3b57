/// Errors raised by the GJK entry points when the input simplex is unusable.
///
/// Non-convergence is not an error: see [`GjkStatus`](crate::query::gjk::GjkStatus).
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GjkError {
    /// The initial simplex has no point.
    #[error("the initial simplex is empty")]
    EmptySimplex,
    /// More than four points were given to seed a simplex.
    #[error("a simplex holds at most 4 points, got {0}")]
    TooManyPoints(usize),
}
