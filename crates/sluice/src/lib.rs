//! Typed stream handles for native resources, with per-call error strategies.
//!
//! # Architecture
//!
//! - [`Registry`] - maps (resource type, element type, direction) to one
//!   [`Provider`], with [`HasInputStream`] / [`HasOutputStream`] as the
//!   structural fallback
//! - [`sluice_strategy`] - [`Throwing`] or [`Capture`], chosen per call
//! - [`sluice_stream`] - the [`Input`] / [`Output`] handles providers produce
//!
//! The free functions in this crate use a lazily built registry holding the
//! built-in providers: `PathBuf`, `file:` [`Url`](url::Url), `SocketAddr`,
//! `TcpStream`, [`Process`] and the standard streams.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use sluice::{Capture, Outcome, Throwing};
//!
//! # fn main() -> sluice::Result<()> {
//! let path = PathBuf::from("notes.txt");
//!
//! let mut out: sluice::Output<String> = sluice::append_output(&path, &Throwing)?;
//! out.write(&"remember the milk".to_string())?;
//! out.close()?;
//!
//! let missing = PathBuf::from("missing.txt");
//! match sluice::input::<String, _>(&missing, &Capture::new(std::io::ErrorKind::NotFound))? {
//!     Outcome::Success(mut lines) => println!("{:?}", lines.read()?),
//!     Outcome::Failure(error) => println!("no notes: {error}"),
//! }
//! # Ok(())
//! # }
//! ```

use once_cell::sync::Lazy;

pub use capability::{HasInputStream, HasOutputStream};
pub use provider::Provider;
pub use registry::{CAPABILITY, Registry};
pub use resource::{Process, Resource};

pub use sluice_strategy::{Capture, Category, Outcome, Strategy, Throwing, When};
pub use sluice_stream::{
    Direction, Element, Error, ErrorKind, Input, NativeInput, NativeOutput, Options, Output, Result,
    State,
};

mod capability;
mod provider;
mod registry;
mod resource;

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(|| Registry::with_defaults(Options::default()));

/// The shared registry behind the free functions. Immutable once built.
pub fn default_registry() -> &'static Registry { &DEFAULT_REGISTRY }

pub fn input<T, S>(resource: &dyn Resource, strategy: &S) -> Result<S::Output<Input<T>>>
where
    T: Element,
    S: Strategy<Error>,
{
    default_registry().input::<T, S>(resource, strategy)
}

pub fn output<T, S>(resource: &dyn Resource, strategy: &S) -> Result<S::Output<Output<T>>>
where
    T: Element,
    S: Strategy<Error>,
{
    default_registry().output::<T, S>(resource, strategy)
}

pub fn append_output<T, S>(resource: &dyn Resource, strategy: &S) -> Result<S::Output<Output<T>>>
where
    T: Element,
    S: Strategy<Error>,
{
    default_registry().append_output::<T, S>(resource, strategy)
}

pub fn input_via<T, S>(
    resource: &dyn Resource,
    provider: &str,
    strategy: &S,
) -> Result<S::Output<Input<T>>>
where
    T: Element,
    S: Strategy<Error>,
{
    default_registry().input_via::<T, S>(resource, provider, strategy)
}

pub fn output_via<T, S>(
    resource: &dyn Resource,
    provider: &str,
    strategy: &S,
) -> Result<S::Output<Output<T>>>
where
    T: Element,
    S: Strategy<Error>,
{
    default_registry().output_via::<T, S>(resource, provider, strategy)
}

pub fn append_output_via<T, S>(
    resource: &dyn Resource,
    provider: &str,
    strategy: &S,
) -> Result<S::Output<Output<T>>>
where
    T: Element,
    S: Strategy<Error>,
{
    default_registry().append_output_via::<T, S>(resource, provider, strategy)
}
