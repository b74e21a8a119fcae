use tracing::trace;

use crate::{Category, Outcome};

mod sealed {
    pub trait Sealed {}
}

/// How the failure of a fallible operation reaches the caller.
///
/// `run` executes the operation exactly once. The outer `Result` carries
/// failures the strategy lets through; [`Strategy::Output`] is the shape of
/// everything it does not.
pub trait Strategy<E>: sealed::Sealed {
    type Output<T>;

    fn run<T>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<Self::Output<T>, E>;

    fn name(&self) -> &'static str;
}

/// Propagate every failure unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Throwing;

impl sealed::Sealed for Throwing {}

impl<E> Strategy<E> for Throwing {
    type Output<T> = T;

    fn run<T>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E> { op() }

    fn name(&self) -> &'static str { "throwing" }
}

/// Capture failures of the declared category into an [`Outcome`].
///
/// Failures outside the category are programming errors from the caller's
/// point of view and propagate uncaught.
#[derive(Clone, Copy, Debug)]
pub struct Capture<C> {
    category: C,
}

impl<C> Capture<C> {
    pub fn new(category: C) -> Self { Self { category } }

    pub fn category(&self) -> &C { &self.category }
}

impl<C> sealed::Sealed for Capture<C> {}

impl<E, C> Strategy<E> for Capture<C>
where
    C: Category<E>,
{
    type Output<T> = Outcome<T, E>;

    fn run<T>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<Outcome<T, E>, E> {
        match op() {
            Ok(value) => Ok(Outcome::Success(value)),
            Err(error) if self.category.matches(&error) => {
                trace!("captured failure of declared category");
                Ok(Outcome::Failure(error))
            }
            Err(error) => Err(error),
        }
    }

    fn name(&self) -> &'static str { "capture" }
}
