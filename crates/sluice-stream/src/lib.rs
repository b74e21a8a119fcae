//! Typed buffered input and output handles over native streams.
//!
//! # Architecture
//!
//! - [`NativeInput`] / [`NativeOutput`] - raw streams handed over by providers
//! - [`Element`] - the unit a handle reads or writes (`u8`, `char`, lines)
//! - [`Input`] / [`Output`] - buffered handles with an explicit lifecycle
//! - [`Error`] / [`ErrorKind`] - failure taxonomy shared by the workspace
//!
//! # Lifecycle
//!
//! A handle is created `Open` by a provider and becomes `Closed` on `close`.
//! Closing twice is a no-op, and nothing reopens a closed handle. Handles
//! over shared process-wide streams ignore `close` beyond flushing.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use sluice_stream::{Input, NativeInput, Options, State};
//!
//! let native = NativeInput::new(Cursor::new(b"first\nsecond\n".to_vec()));
//! let mut lines: Input<String> = Input::new(native, "memory", &Options::new());
//!
//! assert_eq!(lines.read().unwrap().as_deref(), Some("first"));
//! lines.close();
//! assert_eq!(lines.state(), State::Closed);
//! ```

pub use direction::Direction;
pub use element::Element;
pub use error::{Error, ErrorKind, Result};
pub use input::Input;
pub use native::{NativeInput, NativeOutput};
pub use options::Options;
pub use output::Output;

mod direction;
mod element;
mod error;
mod input;
mod native;
mod options;
mod output;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    Open,
    Closed,
}
