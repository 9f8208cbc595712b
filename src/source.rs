use anyhow::Result;
use std::sync::mpsc::{sync_channel, Receiver, TrySendError};
use std::thread;
use std::time::Duration;

use crate::camera::CameraSource;
use crate::detector::HandDetector;
use crate::types::{HandFrame, Point2D};

/// Anything that can yield one `HandFrame` per poll. Consumers don't need to
/// know whether frames come from a real camera or the simulator.
pub trait HandSource: Send {
    fn name(&self) -> String;
    fn poll(&mut self) -> Result<HandFrame>;
}

// =========================================================================
// Camera + detector source
// =========================================================================

pub struct DetectorSource {
    camera: CameraSource,
    detector: HandDetector,
}

impl DetectorSource {
    pub fn new(camera: CameraSource, detector: HandDetector) -> Self {
        Self { camera, detector }
    }
}

impl HandSource for DetectorSource {
    fn name(&self) -> String {
        format!("Hand Landmarks ({})", self.camera.name())
    }

    fn poll(&mut self) -> Result<HandFrame> {
        // A dropped or undecodable camera frame is a skipped tick, not an error.
        let frame = match self.camera.grab() {
            Some(f) => f,
            None => return Ok(HandFrame::NoHand),
        };
        self.detector.detect(&frame)
    }
}

// =========================================================================
// Simulated source, used when no model/camera is available
// =========================================================================

/// Scripted hand that alternates pinched orbital sweeps, open-hand zoom
/// holds, and tracking gaps, at roughly webcam rate.
pub struct SimulatedHandSource {
    frame_count: u32,
}

impl SimulatedHandSource {
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }

    /// The script itself, kept separate from pacing so tests can step it.
    fn frame_at(n: u32) -> HandFrame {
        let phase = n % 300;
        let t = n as f32 * 0.05;

        if phase < 120 {
            // Pinched: midpoint orbits the frame center
            let mid = Point2D::new(0.5 + t.cos() * 0.15, 0.5 + t.sin() * 0.10);
            let half = 0.015; // distance 0.03, well under threshold
            HandFrame::Tips {
                index_tip: Point2D::new(mid.x - half, mid.y),
                thumb_tip: Point2D::new(mid.x + half, mid.y),
            }
        } else if phase < 140 {
            // Hand leaves the frame
            HandFrame::NoHand
        } else if phase < 260 {
            // Open hand: pinch distance breathes between 0.08 and 0.24
            let distance = 0.16 + (t * 0.3).sin() * 0.08;
            HandFrame::Tips {
                index_tip: Point2D::new(0.5 - distance / 2.0, 0.5),
                thumb_tip: Point2D::new(0.5 + distance / 2.0, 0.5),
            }
        } else {
            HandFrame::NoHand
        }
    }
}

impl Default for SimulatedHandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HandSource for SimulatedHandSource {
    fn name(&self) -> String {
        "Simulated Hand".to_string()
    }

    fn poll(&mut self) -> Result<HandFrame> {
        thread::sleep(Duration::from_millis(33)); // ~30 FPS
        self.frame_count += 1;
        Ok(Self::frame_at(self.frame_count))
    }
}

// =========================================================================
// Worker thread
// =========================================================================

/// Run a source on its own thread, delivering frames over a bounded channel.
///
/// The channel holds one frame: if the consumer is mid-tick the newer frame
/// is simply dropped (a late frame means no update that tick). The worker
/// exits when the receiver is gone.
pub fn spawn_source(mut source: Box<dyn HandSource>) -> Receiver<HandFrame> {
    let (tx, rx) = sync_channel::<HandFrame>(1);
    thread::spawn(move || loop {
        let frame = match source.poll() {
            Ok(f) => f,
            Err(_) => HandFrame::NoHand,
        };
        match tx.try_send(frame) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }
    });
    rx
}
