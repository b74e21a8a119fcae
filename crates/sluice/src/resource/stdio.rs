use std::io::{self, Stderr, Stdin, Stdout};

use sluice_stream::{NativeInput, NativeOutput};

use crate::{Provider, Registry};

// Standard streams are shared by the whole process, so every handle over
// them is do-not-close.
pub(super) fn install(registry: &mut Registry) {
    registry.install_builtin(Provider::reader("stdin", |_: &Stdin| {
        Ok(NativeInput::shared(io::stdin()))
    }));

    registry.install_builtin(Provider::writer("stdout", |_: &Stdout| {
        Ok(NativeOutput::shared(io::stdout()))
    }));
    registry.install_builtin(Provider::appender("stdout", |_: &Stdout| {
        Ok(NativeOutput::shared(io::stdout()))
    }));

    registry.install_builtin(Provider::writer("stderr", |_: &Stderr| {
        Ok(NativeOutput::shared(io::stderr()))
    }));
    registry.install_builtin(Provider::appender("stderr", |_: &Stderr| {
        Ok(NativeOutput::shared(io::stderr()))
    }));
}
