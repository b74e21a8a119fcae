//! Resources the default registry knows how to open.

use std::any::Any;
use std::fmt;

use crate::Registry;

pub use process::Process;

mod file;
mod file_url;
mod net;
mod process;
mod stdio;

/// Anything a registry can be asked to open.
///
/// Implemented for every `'static` type with a `Debug` representation; the
/// `Debug` output labels handles and errors.
pub trait Resource: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<R: Any + fmt::Debug> Resource for R {
    fn as_any(&self) -> &dyn Any { self }

    fn type_name(&self) -> &'static str { std::any::type_name::<R>() }
}

pub(crate) fn label(resource: &dyn Resource) -> String { format!("{resource:?}") }

pub(crate) fn install(registry: &mut Registry) {
    file::install(registry);
    file_url::install(registry);
    net::install(registry);
    process::install(registry);
    stdio::install(registry);
}
