use std::fmt;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::{Element, Error, NativeOutput, Options, Result, State};

/// Buffered output over elements of type `T`.
///
/// `close` flushes pending writes before releasing the native stream and is
/// idempotent. A shared handle is flushed on close but never released.
pub struct Output<T> {
    writer:           Option<BufWriter<Box<dyn Write + Send>>>,
    label:            String,
    shared:           bool,
    flush_each_write: bool,
    _element:         PhantomData<fn(T)>,
}

impl<T: Element> Output<T> {
    pub fn new(native: NativeOutput, label: impl Into<String>, options: &Options) -> Self {
        let (inner, shared) = native.into_parts();
        Self {
            writer: Some(BufWriter::with_capacity(options.get_buffer_capacity(), inner)),
            label: label.into(),
            shared,
            flush_each_write: options.get_flush_each_write(),
            _element: PhantomData,
        }
    }

    pub fn write(&mut self, element: &T) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::AlreadyClosed(self.label.clone()))?;
        element.write_to(writer).map_err(|source| Error::Io {
            resource: self.label.clone(),
            source,
        })?;
        if self.flush_each_write {
            self.flush()?;
        }
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, elements: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        elements.into_iter().try_for_each(|element| self.write(element))
    }

    pub fn flush(&mut self) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::AlreadyClosed(self.label.clone()))?;
        writer.flush().map_err(|source| Error::Io {
            resource: self.label.clone(),
            source,
        })
    }

    /// Flush, then release. The handle is closed even when the flush fails.
    pub fn close(&mut self) -> Result<()> {
        if self.shared {
            return self.flush();
        }
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        let flushed = writer.flush();
        drop(writer);
        match flushed {
            Ok(()) => {
                debug!(resource = %self.label, "closed output");
                Ok(())
            }
            Err(source) => {
                warn!(resource = %self.label, error = %source, "flush failed while closing output");
                Err(Error::Io {
                    resource: self.label.clone(),
                    source,
                })
            }
        }
    }

    pub fn state(&self) -> State {
        match self.writer {
            Some(_) => State::Open,
            None => State::Closed,
        }
    }

    pub fn is_shared(&self) -> bool { self.shared }

    pub fn label(&self) -> &str { &self.label }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("label", &self.label)
            .field("open", &self.writer.is_some())
            .field("shared", &self.shared)
            .finish()
    }
}
