use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use sluice_stream::{NativeInput, NativeOutput};

use crate::{Provider, Registry};

pub(crate) fn open_read(path: &Path) -> io::Result<NativeInput> {
    File::open(path).map(NativeInput::new)
}

pub(crate) fn open_write(path: &Path) -> io::Result<NativeOutput> {
    File::create(path).map(NativeOutput::new)
}

pub(crate) fn open_append(path: &Path) -> io::Result<NativeOutput> {
    OpenOptions::new().append(true).create(true).open(path).map(NativeOutput::new)
}

pub(super) fn install(registry: &mut Registry) {
    registry.install_builtin(Provider::reader("file", |path: &PathBuf| open_read(path)));
    registry.install_builtin(Provider::writer("file", |path: &PathBuf| open_write(path)));
    registry.install_builtin(Provider::appender("file", |path: &PathBuf| open_append(path)));
}
