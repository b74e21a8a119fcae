use std::fmt;
use std::io::BufRead;
use std::marker::PhantomData;

use tracing::debug;

use crate::{Element, Error, NativeInput, Options, Result, State};

/// Buffered input over elements of type `T`.
///
/// Owned by whoever opened it. `close` is idempotent; a shared handle keeps
/// its native stream and stays open.
pub struct Input<T> {
    reader:   Option<Box<dyn BufRead + Send>>,
    label:    String,
    shared:   bool,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> Input<T> {
    pub fn new(native: NativeInput, label: impl Into<String>, options: &Options) -> Self {
        let (reader, shared) = native.into_reader(options.get_buffer_capacity());
        Self {
            reader: Some(reader),
            label: label.into(),
            shared,
            _element: PhantomData,
        }
    }

    /// Next element, or `None` at end of stream.
    pub fn read(&mut self) -> Result<Option<T>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| Error::AlreadyClosed(self.label.clone()))?;
        T::read_from(&mut **reader).map_err(|source| Error::Io {
            resource: self.label.clone(),
            source,
        })
    }

    pub fn read_to_end(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.read()? {
            items.push(item);
        }
        Ok(items)
    }

    pub fn close(&mut self) {
        if self.shared {
            debug!(resource = %self.label, "close ignored on shared input");
            return;
        }
        if self.reader.take().is_some() {
            debug!(resource = %self.label, "closed input");
        }
    }

    pub fn state(&self) -> State {
        match self.reader {
            Some(_) => State::Open,
            None => State::Closed,
        }
    }

    pub fn is_shared(&self) -> bool { self.shared }

    pub fn label(&self) -> &str { &self.label }
}

/// Yields until end of stream; a closed handle yields nothing.
impl<T: Element> Iterator for Input<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_none() {
            return None;
        }
        self.read().transpose()
    }
}

impl<T> fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("label", &self.label)
            .field("open", &self.reader.is_some())
            .field("shared", &self.shared)
            .finish()
    }
}
