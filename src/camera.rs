use anyhow::{anyhow, Context, Result};
use colored::*;
use image::{ImageBuffer, Rgb};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};

pub struct CameraSource {
    camera: Camera,
    mirror: bool,
}

impl CameraSource {
    pub fn new(index: u32, mirror: bool) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .context("Failed to create camera instance")?;

        camera
            .open_stream()
            .map_err(|e| anyhow!(e))
            .context("Failed to open camera stream")?;

        println!(
            "{}",
            format!("Opened camera: {}", camera.info().human_name()).green()
        );
        println!("Format: {}", camera.camera_format());

        Ok(Self { camera, mirror })
    }

    /// Grab one frame, mirrored if requested. A failed capture or decode is
    /// not fatal: the caller skips the tick.
    pub fn grab(&mut self) -> Option<ImageBuffer<Rgb<u8>, Vec<u8>>> {
        let frame = self.camera.frame().ok()?;
        let mut decoded = frame.decode_image::<RgbFormat>().ok()?;
        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut decoded);
        }
        Some(decoded)
    }

    pub fn name(&self) -> String {
        self.camera.info().human_name()
    }

    /// Print the camera table for `--list`.
    pub fn print_available() -> Result<()> {
        let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)?;
        println!("Available Cameras:");
        println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
        println!("{}", "-".repeat(60));
        for cam in cameras {
            println!("{:<5} | {:<30} | {:?}", cam.index(), cam.human_name(), cam.misc());
        }
        Ok(())
    }
}
