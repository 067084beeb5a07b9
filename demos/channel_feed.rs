//! Channel feed example.
//!
//! An async task plays the role of a network receiver: it sends 48kHz stereo
//! frames through a tokio channel at an irregular cadence, and the bridge
//! smooths them out for the default output device.
//!
//! Run with: cargo run --example channel_feed

use std::time::Duration;

use audio_bridge::source::MockFrameSource;
use audio_bridge::{AudioBridge, AudioFrame, ChannelFrameSource, CpalOutput};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (tx, rx) = mpsc::channel::<AudioFrame>(32);

    let mut session = AudioBridge::builder()
        .buffer_duration(Duration::from_millis(300))
        .on_event(|event| tracing::info!(?event, "bridge event"))
        .start(ChannelFrameSource::new(rx), CpalOutput::open_default()?)?;

    println!("Streaming a 330Hz tone in bursts for 3 seconds...");

    // Generates the audio; a real receiver would decode packets here
    let generator = MockFrameSource::new(48000, 2);
    let sender = tokio::spawn(async move {
        for burst in 0..50u64 {
            // Two frames back to back, then a gap: jittery but on average real time
            for _ in 0..2 {
                let frame = generator.sine_frame(330.0, Duration::from_millis(30));
                if tx.send(frame).await.is_err() {
                    return;
                }
            }
            let gap = if burst % 5 == 0 { 80 } else { 55 };
            tokio::time::sleep(Duration::from_millis(gap)).await;
        }
    });

    sender.await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let stats = session.stats();
    session.stop()?;

    println!("Stats: {stats:?}");
    Ok(())
}
