//! Tokio mpsc channel frame source.

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::source::{FrameHandler, FrameSource};
use crate::{AudioFrame, BridgeError};

/// A frame source fed through a tokio mpsc channel.
///
/// On attach, a task is spawned on the tokio runtime that forwards every
/// received frame to the bridge. Detaching aborts that task. The source can
/// be attached only once, since the receiver moves into the task.
///
/// # Example
///
/// ```
/// use audio_bridge::{AudioFrame, ChannelFrameSource};
/// use tokio::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel::<AudioFrame>(32);
/// let source = ChannelFrameSource::new(rx);
///
/// // Hand `source` to the bridge builder, then feed it from a decoder:
/// // tx.send(frame).await?;
/// # drop((tx, source));
/// ```
pub struct ChannelFrameSource {
    name: String,
    receiver: Option<mpsc::Receiver<AudioFrame>>,
    runtime: Option<Handle>,
    task: Option<JoinHandle<()>>,
}

impl ChannelFrameSource {
    /// Creates a source that reads frames from `receiver`.
    ///
    /// The forwarding task is spawned on the runtime current at attach time.
    pub fn new(receiver: mpsc::Receiver<AudioFrame>) -> Self {
        Self {
            name: "channel".to_string(),
            receiver: Some(receiver),
            runtime: None,
            task: None,
        }
    }

    /// Creates a source with a custom name.
    pub fn with_name(name: impl Into<String>, receiver: mpsc::Receiver<AudioFrame>) -> Self {
        let mut source = Self::new(receiver);
        source.name = name.into();
        source
    }

    /// Spawns the forwarding task on `runtime` instead of the current runtime.
    ///
    /// Needed when the session is started from a thread outside any runtime.
    #[must_use]
    pub fn on_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Returns `true` while the forwarding task is running.
    pub fn is_forwarding(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl FrameSource for ChannelFrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&mut self, handler: FrameHandler) -> Result<(), BridgeError> {
        let runtime = match self.runtime.clone() {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(BridgeError::backend)?,
        };

        let mut receiver = self
            .receiver
            .take()
            .ok_or_else(|| BridgeError::invalid_config("channel source already attached"))?;

        let name = self.name.clone();
        self.task = Some(runtime.spawn(async move {
            while let Some(frame) = receiver.recv().await {
                handler(&frame);
            }
            tracing::debug!(source = %name, "Frame channel closed");
        }));

        Ok(())
    }

    fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ChannelFrameSource {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_forwards_frames_to_handler() {
        let (tx, rx) = mpsc::channel::<AudioFrame>(10);
        let mut source = ChannelFrameSource::new(rx);

        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<usize>();
        source
            .attach(Arc::new(move |frame: &AudioFrame| {
                let _ = seen_tx.send(frame.samples().len());
            }))
            .unwrap();

        tx.send(AudioFrame::mono(vec![1, 2, 3], 16000)).await.unwrap();
        assert_eq!(seen_rx.recv().await, Some(3));
        assert!(source.is_forwarding());
    }

    #[tokio::test]
    async fn test_second_attach_rejected() {
        let (_tx, rx) = mpsc::channel::<AudioFrame>(10);
        let mut source = ChannelFrameSource::new(rx);

        source.attach(Arc::new(|_: &AudioFrame| {})).unwrap();
        let err = source.attach(Arc::new(|_: &AudioFrame| {})).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_detach_stops_forwarding() {
        let (tx, rx) = mpsc::channel::<AudioFrame>(10);
        let mut source = ChannelFrameSource::with_name("decoder", rx);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        source
            .attach(Arc::new(move |_: &AudioFrame| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        source.detach();
        source.detach();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!source.is_forwarding());
        // The receiver was dropped with the aborted task
        assert!(tx.send(AudioFrame::mono(vec![1], 16000)).await.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(source.name(), "decoder");
    }

    #[test]
    fn test_attach_outside_runtime_fails() {
        let (_tx, rx) = mpsc::channel::<AudioFrame>(1);
        let mut source = ChannelFrameSource::new(rx);
        let err = source.attach(Arc::new(|_: &AudioFrame| {})).unwrap_err();
        assert!(matches!(err, BridgeError::Backend(_)));
    }
}
