use crate::types::{GestureEvent, GestureMode, PinchObservation, Point2D};

// =========================================================================
// Mode Tracker
// Turns successive classified frames into events: deltas for Rotate,
// absolute readings for Scale. Holds the only cross-frame gesture state.
// =========================================================================

/// Invariant: `last_midpoint` is `Some` exactly while `last_mode == Rotating`.
/// Any transition out of Rotating (scaling, hand lost) clears it, so rotation
/// deltas never span a mode switch or a tracking gap.
pub struct ModeTracker {
    last_mode: GestureMode,
    last_midpoint: Option<Point2D>,
}

impl ModeTracker {
    pub fn new() -> Self {
        Self {
            last_mode: GestureMode::Idle,
            last_midpoint: None,
        }
    }

    /// Feed one frame. `None` means no hand was observed this frame.
    pub fn update(&mut self, frame: Option<(PinchObservation, GestureMode)>) -> GestureEvent {
        let (obs, intended) = match frame {
            Some(f) => f,
            None => {
                // Tracking lost: reset, emit nothing. Expected steady state,
                // not a fault.
                self.last_mode = GestureMode::Idle;
                self.last_midpoint = None;
                return GestureEvent::None;
            }
        };

        match intended {
            GestureMode::Scaling => {
                self.last_mode = GestureMode::Scaling;
                self.last_midpoint = None;
                GestureEvent::Scale {
                    distance: obs.distance,
                }
            }
            GestureMode::Rotating => {
                self.last_mode = GestureMode::Rotating;
                match self.last_midpoint.replace(obs.midpoint) {
                    // Continuously rotating: frame-to-frame midpoint diff.
                    Some(last) => GestureEvent::Rotate {
                        dx: obs.midpoint.x - last.x,
                        dy: obs.midpoint.y - last.y,
                    },
                    // Fresh entry into rotate: nothing to diff against yet.
                    None => GestureEvent::None,
                }
            }
            // The classifier never emits Idle; treat it like a lost hand.
            GestureMode::Idle => {
                self.last_mode = GestureMode::Idle;
                self.last_midpoint = None;
                GestureEvent::None
            }
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.last_mode
    }

    #[cfg(test)]
    fn midpoint_armed(&self) -> bool {
        self.last_midpoint.is_some()
    }
}

impl Default for ModeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate_frame(x: f32, y: f32) -> Option<(PinchObservation, GestureMode)> {
        Some((
            PinchObservation {
                distance: 0.05,
                midpoint: Point2D::new(x, y),
            },
            GestureMode::Rotating,
        ))
    }

    fn scale_frame(distance: f32) -> Option<(PinchObservation, GestureMode)> {
        Some((
            PinchObservation {
                distance,
                midpoint: Point2D::new(0.5, 0.5),
            },
            GestureMode::Scaling,
        ))
    }

    #[test]
    fn test_first_rotate_frame_emits_nothing() {
        let mut tracker = ModeTracker::new();
        assert_eq!(tracker.update(rotate_frame(0.40, 0.50)), GestureEvent::None);
        assert_eq!(tracker.mode(), GestureMode::Rotating);
    }

    #[test]
    fn test_second_rotate_frame_emits_midpoint_delta() {
        let mut tracker = ModeTracker::new();
        tracker.update(rotate_frame(0.40, 0.50));
        let event = tracker.update(rotate_frame(0.42, 0.53));
        match event {
            GestureEvent::Rotate { dx, dy } => {
                assert!((dx - 0.02).abs() < 1e-6);
                assert!((dy - 0.03).abs() < 1e-6);
            }
            other => panic!("expected Rotate, got {:?}", other),
        }
    }

    #[test]
    fn test_scale_frames_pass_distance_through() {
        let mut tracker = ModeTracker::new();
        assert_eq!(
            tracker.update(scale_frame(0.10)),
            GestureEvent::Scale { distance: 0.10 }
        );
        assert_eq!(tracker.mode(), GestureMode::Scaling);
        assert!(!tracker.midpoint_armed());
    }

    #[test]
    fn test_hand_lost_resets_state() {
        let mut tracker = ModeTracker::new();
        tracker.update(rotate_frame(0.40, 0.50));
        assert!(tracker.midpoint_armed());

        assert_eq!(tracker.update(None), GestureEvent::None);
        assert_eq!(tracker.mode(), GestureMode::Idle);
        assert!(!tracker.midpoint_armed());
    }

    #[test]
    fn test_gap_breaks_delta_continuity() {
        // Hand disappears mid-rotation and reappears at the SAME midpoint:
        // must be treated as a fresh entry, no delta.
        let mut tracker = ModeTracker::new();
        tracker.update(rotate_frame(0.40, 0.50));
        tracker.update(rotate_frame(0.42, 0.53));
        tracker.update(None);
        assert_eq!(tracker.update(rotate_frame(0.42, 0.53)), GestureEvent::None);
        // Continuity resumes on the next frame
        assert!(matches!(
            tracker.update(rotate_frame(0.43, 0.53)),
            GestureEvent::Rotate { .. }
        ));
    }

    #[test]
    fn test_scale_interval_breaks_delta_continuity() {
        let mut tracker = ModeTracker::new();
        tracker.update(rotate_frame(0.40, 0.50));
        tracker.update(scale_frame(0.10));
        assert!(!tracker.midpoint_armed());
        // Back to rotate: fresh entry again
        assert_eq!(tracker.update(rotate_frame(0.40, 0.50)), GestureEvent::None);
    }

    #[test]
    fn test_midpoint_armed_iff_rotating() {
        let mut tracker = ModeTracker::new();
        let frames = [
            rotate_frame(0.40, 0.50),
            rotate_frame(0.41, 0.51),
            scale_frame(0.10),
            rotate_frame(0.30, 0.30),
            None,
            scale_frame(0.08),
            None,
            rotate_frame(0.20, 0.20),
        ];
        for frame in frames {
            tracker.update(frame);
            assert_eq!(
                tracker.midpoint_armed(),
                tracker.mode() == GestureMode::Rotating,
                "midpoint/mode invariant broken after {:?}",
                frame
            );
        }
    }
}
