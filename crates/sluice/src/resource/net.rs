use std::net::{SocketAddr, TcpStream};

use sluice_stream::{NativeInput, NativeOutput};

use crate::{Provider, Registry};

// Sockets have no append mode; only read and write are registered.
pub(super) fn install(registry: &mut Registry) {
    registry.install_builtin(Provider::reader("tcp", |addr: &SocketAddr| {
        TcpStream::connect(addr).map(NativeInput::new)
    }));
    registry.install_builtin(Provider::writer("tcp", |addr: &SocketAddr| {
        TcpStream::connect(addr).map(NativeOutput::new)
    }));

    registry.install_builtin(Provider::reader("tcp-stream", |stream: &TcpStream| {
        stream.try_clone().map(NativeInput::new)
    }));
    registry.install_builtin(Provider::writer("tcp-stream", |stream: &TcpStream| {
        stream.try_clone().map(NativeOutput::new)
    }));
}
