//! Structural fallback for resource types that expose their own streams.
//!
//! A type opts in by implementing [`HasInputStream`] and/or
//! [`HasOutputStream`] and registering the capability with a
//! [`Registry`](crate::Registry). A capability covers every element type;
//! a specific provider for the same resource type always takes precedence.

use std::io;

use sluice_stream::{NativeInput, NativeOutput};

pub trait HasInputStream {
    fn input_stream(&self) -> io::Result<NativeInput>;
}

pub trait HasOutputStream {
    /// `append` asks for writes after existing content rather than replacing it.
    fn output_stream(&self, append: bool) -> io::Result<NativeOutput>;
}
