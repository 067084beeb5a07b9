//! Tone playback example.
//!
//! Feeds a 440Hz mono sine from a mock source into the default output device.
//! The bridge upmixes and resamples it to whatever format the device pulls.
//!
//! Run with: cargo run --example tone_playback

use std::thread;
use std::time::Duration;

use audio_bridge::source::MockFrameSource;
use audio_bridge::{AudioBridge, BridgeEvent, CpalOutput};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let output = CpalOutput::open_default()?;
    let (rate, channels) = output.native_config()?;
    println!("Playing on the default device ({rate}Hz, {channels}ch) for 3 seconds...");

    // A typical speech decoder: 16kHz mono, 20ms frames
    let source = MockFrameSource::new(16000, 1);

    let mut session = AudioBridge::builder()
        .on_event(|event| match event {
            BridgeEvent::Overrun { dropped_bytes } => {
                eprintln!("Warning: overwrote {dropped_bytes} unread bytes");
            }
            BridgeEvent::Starved { missing_samples } => {
                eprintln!("Warning: {missing_samples} samples of silence");
            }
            BridgeEvent::EndpointError { reason } => {
                eprintln!("Playback error: {reason}");
            }
            other => println!("{other:?}"),
        })
        .start(source.clone(), output)?;

    for _ in 0..150 {
        source.emit(&source.sine_frame(440.0, Duration::from_millis(20)));
        thread::sleep(Duration::from_millis(20));
    }

    let stats = session.stats();
    session.stop()?;

    println!("Stats: {stats:?}");
    Ok(())
}
