use std::io;
use std::path::PathBuf;

use url::Url;

use super::file::{open_append, open_read, open_write};
use crate::{Provider, Registry};

/// Only `file:` URLs are local; anything else needs a network client this
/// layer does not carry.
fn local_path(url: &Url) -> io::Result<PathBuf> {
    if url.scheme() != "file" {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("unsupported url scheme '{}'", url.scheme()),
        ));
    }
    url.to_file_path().map_err(|()| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("url '{url}' has no local path"))
    })
}

pub(super) fn install(registry: &mut Registry) {
    registry.install_builtin(Provider::reader("url", |url: &Url| open_read(&local_path(url)?)));
    registry.install_builtin(Provider::writer("url", |url: &Url| open_write(&local_path(url)?)));
    registry.install_builtin(Provider::appender("url", |url: &Url| open_append(&local_path(url)?)));
}
