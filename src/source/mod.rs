//! Frame sources: where decoded audio comes from.
//!
//! A [`FrameSource`] delivers [`AudioFrame`]s to a handler registered with
//! [`attach`](FrameSource::attach). The session attaches once when it starts
//! and detaches once when it stops. How frames travel to the source (network,
//! decoder thread, IPC) is the source's business.
//!
//! [`AudioFrame`]: crate::AudioFrame

mod channel;
mod mock;

pub use channel::ChannelFrameSource;
pub use mock::MockFrameSource;

use std::sync::Arc;

use crate::{AudioFrame, BridgeError};

/// Handler invoked for every frame a source produces.
///
/// May be called from any thread. The frame is only borrowed for the call.
pub type FrameHandler = Arc<dyn Fn(&AudioFrame) + Send + Sync>;

/// A producer of decoded audio frames.
///
/// # Implementation Notes
///
/// - `attach` is called exactly once per session, before any frame is expected
/// - `detach` is called exactly once when the session stops; after it returns
///   the handler should no longer be invoked
/// - Frames may be delivered at any cadence and from any thread
///
/// # Example
///
/// ```
/// use audio_bridge::{AudioFrame, BridgeError, FrameHandler, FrameSource};
///
/// struct SilenceOnce {
///     handler: Option<FrameHandler>,
/// }
///
/// impl FrameSource for SilenceOnce {
///     fn name(&self) -> &str {
///         "silence-once"
///     }
///
///     fn attach(&mut self, handler: FrameHandler) -> Result<(), BridgeError> {
///         handler(&AudioFrame::mono(vec![0; 480], 48000));
///         self.handler = Some(handler);
///         Ok(())
///     }
///
///     fn detach(&mut self) {
///         self.handler = None;
///     }
/// }
/// ```
pub trait FrameSource {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Registers the handler that receives frames.
    ///
    /// Errors here are fatal and prevent the session from starting.
    fn attach(&mut self, handler: FrameHandler) -> Result<(), BridgeError>;

    /// Deregisters the handler. Must tolerate being called without a prior
    /// successful `attach`.
    fn detach(&mut self);
}
