//! Run a blocking connect on its own thread and poll it for completion.

use std::thread::JoinHandle;

use crate::backend::{BackendError, HandshakePoll};

/// A connection being opened in the background.
#[derive(Debug)]
pub struct BackgroundHandshake<C> {
    handle: Option<JoinHandle<Result<C, BackendError>>>,
}

impl<C: Send + 'static> BackgroundHandshake<C> {
    pub fn spawn<F>(name: &str, connect: F) -> Result<Self, BackendError>
    where
        F: FnOnce() -> Result<C, BackendError> + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(connect)?;
        Ok(BackgroundHandshake {
            handle: Some(handle),
        })
    }

    /// Never blocks. Once `Ready` or `Failed` has been returned the handshake is spent.
    pub fn poll(&mut self) -> HandshakePoll<C> {
        match self.handle.take() {
            None => HandshakePoll::Failed(BackendError::Protocol(
                "handshake already completed".to_string(),
            )),
            Some(handle) if !handle.is_finished() => {
                self.handle = Some(handle);
                HandshakePoll::Pending
            }
            Some(handle) => match handle.join() {
                Ok(Ok(connection)) => HandshakePoll::Ready(connection),
                Ok(Err(error)) => HandshakePoll::Failed(error),
                Err(_) => HandshakePoll::Failed(BackendError::HandshakePanicked),
            },
        }
    }
}
