use thiserror::Error;

/// Failures raised while bringing up or driving an audio host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no default output device available")]
    NoDevice,

    #[error("failed to fetch default output config: {0}")]
    DefaultConfig(String),

    #[error("unsupported sample format {0}, expected f32")]
    UnsupportedFormat(String),

    #[error("failed to build output stream: {0}")]
    BuildStream(String),

    #[error("failed to start output stream: {0}")]
    Play(String),

    #[error("failed to pause output stream: {0}")]
    Pause(String),

    #[error("host was not opened before launch")]
    NotOpened,

    #[error("host has no running stream")]
    NotLaunched,
}
