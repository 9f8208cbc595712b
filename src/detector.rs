use anyhow::Result;
use image::{imageops::FilterType, ImageBuffer, Rgb};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use crate::types::{HandFrame, Point2D};

// MediaPipe hand landmark layout: 21 points, 3 floats each.
const LANDMARK_COUNT: usize = 21;
const THUMB_TIP: usize = 4;
const INDEX_TIP: usize = 8;

const INPUT_SIZE: u32 = 224;
const PRESENCE_THRESHOLD: f32 = 0.5;

/// ONNX hand landmark detector. Produces at most one fingertip pair per
/// frame; anything malformed (low presence score, missing outputs, points
/// far outside the frame) degrades to `HandFrame::NoHand`.
pub struct HandDetector {
    session: Session,
}

impl HandDetector {
    pub fn new(model_path: &str) -> Result<Self> {
        println!("Loading hand landmark model from {}...", model_path);
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(model_path)?;

        Ok(Self { session })
    }

    pub fn detect(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<HandFrame> {
        // Preprocess: resize to 224x224, NCHW, [0,1] normalization
        let resized = image::imageops::resize(frame, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        let side = INPUT_SIZE as usize;
        let mut input_data = Vec::with_capacity(3 * side * side);
        for c in 0..3 {
            for y in 0..INPUT_SIZE {
                for x in 0..INPUT_SIZE {
                    let p = resized.get_pixel(x, y)[c];
                    input_data.push(p as f32 / 255.0);
                }
            }
        }

        let input = Tensor::from_array((vec![1, 3, side, side], input_data))?;
        let outputs = self.session.run(ort::inputs![input])?;

        // Output 0: landmarks [1, 63] in input-pixel scale. Output 1: hand
        // presence score [1, 1].
        if outputs.len() < 2 {
            return Ok(HandFrame::NoHand);
        }
        let (_, landmarks) = outputs[0].try_extract_tensor::<f32>()?;
        let (_, score) = outputs[1].try_extract_tensor::<f32>()?;

        if landmarks.len() < LANDMARK_COUNT * 3 || score.is_empty() {
            return Ok(HandFrame::NoHand);
        }
        if score[0] < PRESENCE_THRESHOLD {
            return Ok(HandFrame::NoHand);
        }

        let tip = |idx: usize| -> Option<Point2D> {
            let x = landmarks[idx * 3] / INPUT_SIZE as f32;
            let y = landmarks[idx * 3 + 1] / INPUT_SIZE as f32;
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            // A tip slightly off-frame is fine (clamped below); far outside
            // means the model produced garbage for this frame.
            if !(-0.5..=1.5).contains(&x) || !(-0.5..=1.5).contains(&y) {
                return None;
            }
            Some(Point2D::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)))
        };

        match (tip(INDEX_TIP), tip(THUMB_TIP)) {
            (Some(index_tip), Some(thumb_tip)) => Ok(HandFrame::Tips {
                index_tip,
                thumb_tip,
            }),
            _ => Ok(HandFrame::NoHand),
        }
    }
}
