/// Errors that can occur in the transport layer.
///
/// Every variant means the link itself is in trouble. Callers above this
/// layer treat all of them as a transport failure and never retry on
/// their own.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed (locally or by the peer).
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting or dialing a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
