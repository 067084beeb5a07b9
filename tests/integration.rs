//! Integration tests for audio-bridge.
//!
//! Note: Tests that require actual audio hardware are marked with
//! `#[ignore]` and should be run manually.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use audio_bridge::{
    AudioBridge, AudioFrame, BridgeConfig, BridgeError, BridgeEvent, ChannelFrameSource,
    CpalOutput, LinearResampler, ManualEndpoint, MockFrameSource,
};
use tokio::sync::mpsc;

fn recorded() -> (Arc<Mutex<Vec<BridgeEvent>>>, impl Fn(BridgeEvent) + Send + Sync) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    (events, move |e| sink.lock().unwrap().push(e))
}

#[test]
fn test_pull_before_any_frame_then_mono_frame() {
    let source = MockFrameSource::new(48000, 1);
    let endpoint = ManualEndpoint::new();
    let mut session = AudioBridge::builder()
        .start(source.clone(), endpoint.clone())
        .unwrap();

    let first = endpoint.pull(960, 2, 48000);
    assert_eq!(first, vec![0.0; 960]);

    let samples: Vec<i16> = (0..480).map(|i| (i * 64) as i16).collect();
    let frame = source.frame(samples.clone()).unwrap();
    assert!(source.emit(&frame));

    let second = endpoint.pull(960, 2, 48000);
    let expected: Vec<f32> = samples
        .iter()
        .flat_map(|&s| {
            let v = f32::from(s) / 32768.0;
            [v, v]
        })
        .collect();
    assert_eq!(second, expected);

    let stats = session.stats();
    assert_eq!(stats.frames_written, 1);
    assert_eq!(stats.pulls, 2);
    assert_eq!(stats.format_changes, 1);

    session.stop().unwrap();
}

#[test]
fn test_frames_before_first_pull_are_dropped() {
    let source = MockFrameSource::new(48000, 2);
    let endpoint = ManualEndpoint::new();
    let session = AudioBridge::builder()
        .start(source.clone(), endpoint.clone())
        .unwrap();

    source.emit(&source.sine_frame(440.0, Duration::from_millis(10)));
    assert_eq!(session.stats().frames_dropped, 1);

    // Only silence comes out: nothing was buffered
    let output = endpoint.pull(960, 2, 48000);
    assert!(output.iter().all(|&s| s == 0.0));
}

#[test]
fn test_teardown_is_idempotent() {
    let source = MockFrameSource::new(16000, 1);
    let endpoint = ManualEndpoint::new();
    let mut session = AudioBridge::builder()
        .start(source.clone(), endpoint.clone())
        .unwrap();
    let bridge = Arc::clone(session.bridge());

    endpoint.pull(320, 1, 16000);
    source.emit(&source.sine_frame(200.0, Duration::from_millis(20)));

    session.stop().unwrap();
    session.stop().unwrap();
    assert!(!session.is_running());
    drop(session);

    assert_eq!(source.attach_count(), 1);
    assert_eq!(source.detach_count(), 1);
    assert_eq!(endpoint.start_count(), 1);
    assert_eq!(endpoint.stop_count(), 1);

    // Frames after teardown go nowhere, the bridge refuses direct pushes
    assert!(!source.emit(&source.silence_frame(Duration::from_millis(10))));
    assert_eq!(
        bridge.push_frame(&AudioFrame::mono(vec![1; 16], 16000)),
        Err(BridgeError::Closed)
    );
    assert_eq!(bridge.buffer_capacity(), 0);
}

#[test]
fn test_fallback_when_resampler_declines() {
    let (events, on_event) = recorded();
    let source = MockFrameSource::new(48000, 1);
    let endpoint = ManualEndpoint::new();
    let _session = AudioBridge::builder()
        .resampler(|_: &AudioFrame, _: u16, _: u32| Vec::<i16>::new())
        .on_event(on_event)
        .start(source.clone(), endpoint.clone())
        .unwrap();

    endpoint.pull(8, 2, 48000);
    source.emit(&source.frame(vec![8192, 16384, -8192, 0]).unwrap());
    source.emit(&source.frame(vec![0, 0, 0, 0]).unwrap());

    let output = endpoint.pull(8, 2, 48000);
    assert_eq!(output, vec![0.25, 0.25, 0.5, 0.5, -0.25, -0.25, 0.0, 0.0]);

    let fallback_events = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, BridgeEvent::FallbackRemix { .. }))
        .count();
    assert_eq!(fallback_events, 1);
}

#[test]
fn test_declined_stereo_frame_is_dropped() {
    let source = MockFrameSource::new(48000, 2);
    let endpoint = ManualEndpoint::new();
    let session = AudioBridge::builder()
        .resampler(|_: &AudioFrame, _: u16, _: u32| Vec::<i16>::new())
        .start(source.clone(), endpoint.clone())
        .unwrap();

    endpoint.pull(8, 1, 48000);
    source.emit(&source.frame(vec![100; 8]).unwrap());

    assert_eq!(session.bridge().buffered_bytes(), 0);
    assert_eq!(session.stats().fallback_remixes, 0);
    assert_eq!(session.stats().frames_dropped, 1);
}

#[test]
fn test_format_change_reallocates_and_discards() {
    let (events, on_event) = recorded();
    let source = MockFrameSource::new(48000, 2);
    let endpoint = ManualEndpoint::new();
    let session = AudioBridge::builder()
        .on_event(on_event)
        .start(source.clone(), endpoint.clone())
        .unwrap();

    endpoint.pull(960, 2, 48000);
    source.emit(&source.sine_frame(440.0, Duration::from_millis(10)));
    assert_eq!(session.bridge().buffered_bytes(), 960 * 2);

    // Device switches to 44.1kHz mono
    let output = endpoint.pull(441, 1, 44100);
    assert!(output.iter().all(|&s| s == 0.0));
    assert_eq!(session.bridge().tracked_format(), Some((44100, 1)));
    assert_eq!(session.bridge().buffered_bytes(), 0);
    assert_eq!(session.bridge().buffer_capacity(), 44100 / 5 * 2);

    // New frames are converted to the new format
    source.emit(&source.sine_frame(440.0, Duration::from_millis(10)));
    let buffered = session.bridge().buffered_bytes();
    assert!((441 * 2..=442 * 2).contains(&buffered), "buffered {buffered}");

    let events = events.lock().unwrap();
    let changes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            BridgeEvent::FormatChanged {
                previous, current, ..
            } => Some((*previous, *current)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![(None, (48000, 2)), (Some((48000, 2)), (44100, 1))]
    );
}

#[test]
fn test_overrun_overwrites_oldest() {
    let source = MockFrameSource::new(8000, 1);
    let endpoint = ManualEndpoint::new();
    let session = AudioBridge::builder()
        .buffer_duration(Duration::from_millis(10))
        .start(source.clone(), endpoint.clone())
        .unwrap();

    // 10ms at 8kHz mono = 80 samples = 160 bytes
    endpoint.pull(80, 1, 8000);
    for value in 1..=3i16 {
        source.emit(&source.frame(vec![value; 40]).unwrap());
    }

    assert_eq!(session.bridge().buffered_bytes(), 160);
    assert_eq!(session.stats().overrun_bytes, 80);

    let output = endpoint.pull(80, 1, 8000);
    assert_eq!(output[0], 2.0 / 32768.0);
    assert_eq!(output[79], 3.0 / 32768.0);
}

#[test]
fn test_endpoint_error_becomes_event() {
    let (events, on_event) = recorded();
    let source = MockFrameSource::new(8000, 1);
    let endpoint = ManualEndpoint::new();
    let _session = AudioBridge::builder()
        .on_event(on_event)
        .start(source, endpoint.clone())
        .unwrap();

    endpoint.raise_error("stream invalidated");

    assert!(events.lock().unwrap().contains(&BridgeEvent::EndpointError {
        reason: "stream invalidated".to_string()
    }));
}

#[test]
fn test_concurrent_producer_and_consumer() {
    let bridge = Arc::new(
        AudioBridge::new(
            LinearResampler::new(),
            BridgeConfig {
                buffer_duration: Duration::from_millis(50),
                ..Default::default()
            },
        )
        .unwrap(),
    );

    let mut output = vec![0.0f32; 96];
    bridge.on_consumer_pull(&mut output, 2, 48000);

    let producer = {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || {
            for _ in 0..500 {
                bridge.on_frame_produced(&AudioFrame::mono(vec![1000; 480], 48000));
            }
        })
    };

    let consumer = {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || {
            let mut output = vec![0.0f32; 96];
            for _ in 0..500 {
                bridge.on_consumer_pull(&mut output, 2, 48000);
                // Every sample is either silence or the producer's value
                assert!(output
                    .iter()
                    .all(|&s| s == 0.0 || s == 1000.0 / 32768.0));
            }
        })
    };

    producer.join().unwrap();
    consumer.join().unwrap();

    let stats = bridge.stats();
    assert_eq!(stats.frames_received, 500);
    assert_eq!(stats.frames_written, 500);
    assert_eq!(stats.pulls, 501);
    assert!(bridge.buffered_bytes() <= bridge.buffer_capacity());
}

#[tokio::test]
async fn test_channel_source_feeds_bridge() {
    let (tx, rx) = mpsc::channel::<AudioFrame>(8);
    let endpoint = ManualEndpoint::new();
    let mut session = AudioBridge::builder()
        .start(ChannelFrameSource::new(rx), endpoint.clone())
        .unwrap();

    endpoint.pull(4, 1, 16000);
    tx.send(AudioFrame::mono(vec![16384; 4], 16000))
        .await
        .unwrap();

    // Wait for the forwarding task to deliver the frame
    for _ in 0..100 {
        if session.bridge().buffered_bytes() == 8 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(endpoint.pull(4, 1, 16000), vec![0.5; 4]);

    session.stop().unwrap();
    // The forwarding task dropped the receiver
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(tx.send(AudioFrame::mono(vec![1], 16000)).await.is_err());
}

#[test]
#[ignore = "requires audio hardware"]
fn test_real_playback() {
    let source = MockFrameSource::new(48000, 1);
    let output = CpalOutput::open_default().unwrap();
    let mut session = AudioBridge::builder().start(source.clone(), output).unwrap();

    for _ in 0..50 {
        source.emit(&source.sine_frame(440.0, Duration::from_millis(20)));
        thread::sleep(Duration::from_millis(20));
    }

    let stats = session.stats();
    println!("Stats: {stats:?}");
    session.stop().unwrap();
    assert!(stats.pulls > 0);
}
