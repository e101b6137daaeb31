/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or upgrading an accepted socket failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

impl TransportError {
    /// Wraps a foreign error as a `SendFailed` with `BrokenPipe` kind.
    pub(crate) fn send<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::SendFailed(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            err,
        ))
    }

    /// Wraps a foreign error as a `ReceiveFailed` with `ConnectionReset` kind.
    pub(crate) fn receive<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::ReceiveFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            err,
        ))
    }
}
