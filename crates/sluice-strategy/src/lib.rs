//! Per-call error handling strategies for fallible construction.
//!
//! # Architecture
//!
//! A [`Strategy`] decides how the failure of a fallible operation reaches the
//! caller. The set of strategies is closed:
//!
//! - [`Throwing`] - the failure propagates unchanged.
//! - [`Capture`] - failures of one declared [`Category`] become a tagged
//!   [`Outcome::Failure`]; every other failure still propagates.
//!
//! A strategy is a plain value handed to each call, so two call sites in the
//! same program choose independently.
//!
//! # Example
//!
//! ```
//! use sluice_strategy::{Capture, Outcome, Strategy, Throwing, When};
//!
//! #[derive(Debug, PartialEq)]
//! enum Failure {
//!     Missing,
//!     Broken,
//! }
//!
//! let missing = || -> Result<u32, Failure> { Err(Failure::Missing) };
//!
//! assert_eq!(Throwing.run(missing), Err(Failure::Missing));
//!
//! let capture = Capture::new(When(|e: &Failure| *e == Failure::Missing));
//! assert_eq!(capture.run(missing), Ok(Outcome::Failure(Failure::Missing)));
//! assert_eq!(capture.run(|| Err::<u32, _>(Failure::Broken)), Err(Failure::Broken));
//! ```

pub use category::{Category, When};
pub use outcome::Outcome;
pub use strategy::{Capture, Strategy, Throwing};

mod category;
mod outcome;
mod strategy;
