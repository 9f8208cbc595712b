use crate::types::{GestureMode, PinchObservation, Point2D};

// =========================================================================
// Gesture Classifier
// Pure per-frame classification: pinch distance + midpoint, then a hard
// threshold compare. No cross-frame state lives here.
// =========================================================================

/// Classify a single frame's fingertip pair.
///
/// Distance below `pinch_threshold` reads as a closed pinch (Rotate mode),
/// at or above as an open hand (Scale mode). The boundary value itself goes
/// to Scale; there is no hysteresis band.
pub fn classify(
    index_tip: Point2D,
    thumb_tip: Point2D,
    pinch_threshold: f32,
) -> (PinchObservation, GestureMode) {
    let distance = index_tip.distance(&thumb_tip);
    let midpoint = index_tip.midpoint(&thumb_tip);

    let mode = if distance < pinch_threshold {
        GestureMode::Rotating
    } else {
        GestureMode::Scaling
    };

    (PinchObservation { distance, midpoint }, mode)
}
