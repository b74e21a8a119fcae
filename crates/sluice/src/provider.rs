use std::fmt;
use std::io;
use std::sync::Arc;

use sluice_stream::{Direction, NativeInput, NativeOutput};

pub(crate) type ReadFn<R> = Arc<dyn Fn(&R) -> io::Result<NativeInput> + Send + Sync>;
pub(crate) type WriteFn<R> = Arc<dyn Fn(&R) -> io::Result<NativeOutput> + Send + Sync>;

pub(crate) enum Opener<R> {
    Read(ReadFn<R>),
    Write(WriteFn<R>),
}

impl<R> Clone for Opener<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Read(open) => Self::Read(open.clone()),
            Self::Write(open) => Self::Write(open.clone()),
        }
    }
}

/// Named opening function for resources of type `R` in one direction.
pub struct Provider<R> {
    name:      &'static str,
    direction: Direction,
    opener:    Opener<R>,
}

impl<R> Provider<R> {
    pub fn reader<F>(name: &'static str, open: F) -> Self
    where
        F: Fn(&R) -> io::Result<NativeInput> + Send + Sync + 'static,
    {
        Self {
            name,
            direction: Direction::Read,
            opener: Opener::Read(Arc::new(open)),
        }
    }

    pub fn writer<F>(name: &'static str, open: F) -> Self
    where
        F: Fn(&R) -> io::Result<NativeOutput> + Send + Sync + 'static,
    {
        Self {
            name,
            direction: Direction::Write,
            opener: Opener::Write(Arc::new(open)),
        }
    }

    pub fn appender<F>(name: &'static str, open: F) -> Self
    where
        F: Fn(&R) -> io::Result<NativeOutput> + Send + Sync + 'static,
    {
        Self {
            name,
            direction: Direction::Append,
            opener: Opener::Write(Arc::new(open)),
        }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn direction(&self) -> Direction { self.direction }

    pub(crate) fn into_opener(self) -> Opener<R> { self.opener }
}

impl<R> Clone for Provider<R> {
    fn clone(&self) -> Self {
        Self {
            name:      self.name,
            direction: self.direction,
            opener:    self.opener.clone(),
        }
    }
}

impl<R> fmt::Debug for Provider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .finish()
    }
}
