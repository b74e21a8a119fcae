use std::io;

use sluice_strategy::Category;
use thiserror::Error;

use crate::Direction;

#[derive(Debug, Error)]
pub enum Error {
    #[error("resource unavailable: {resource}: {source}")]
    ResourceUnavailable {
        resource: String,
        #[source]
        source:   io::Error,
    },

    #[error("handle already closed: {0}")]
    AlreadyClosed(String),

    #[error("no provider for {resource} ({direction} {element})")]
    UnsupportedResourceType {
        resource:  &'static str,
        element:   &'static str,
        direction: Direction,
    },

    #[error("no provider named '{provider}' for {resource} ({direction} {element})")]
    UnknownProvider {
        provider:  String,
        resource:  &'static str,
        element:   &'static str,
        direction: Direction,
    },

    #[error("provider '{provider}' conflicts with an existing one for {resource} ({direction} {element})")]
    DuplicateProvider {
        provider:  String,
        resource:  &'static str,
        element:   &'static str,
        direction: Direction,
    },

    #[error("i/o failure on {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source:   io::Error,
    },

    #[error("invalid options: {0}")]
    Config(#[from] toml::de::Error),
}

/// Closed failure taxonomy used to declare capture categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ResourceUnavailable,
    AlreadyClosed,
    UnsupportedResourceType,
    Registration,
    Io,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceUnavailable { .. } => ErrorKind::ResourceUnavailable,
            Self::AlreadyClosed(_) => ErrorKind::AlreadyClosed,
            Self::UnsupportedResourceType { .. } | Self::UnknownProvider { .. } => {
                ErrorKind::UnsupportedResourceType
            }
            Self::DuplicateProvider { .. } => ErrorKind::Registration,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Native cause, when the failure came from the platform.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::ResourceUnavailable { source, .. } | Self::Io { source, .. } => {
                Some(source.kind())
            }
            _ => None,
        }
    }
}

impl Category<Error> for ErrorKind {
    fn matches(&self, error: &Error) -> bool { error.kind() == *self }
}

impl Category<Error> for io::ErrorKind {
    fn matches(&self, error: &Error) -> bool { error.io_kind() == Some(*self) }
}

pub type Result<T> = std::result::Result<T, Error>;
