use clap::Parser;
use colored::*;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use rusty_hands::args::Args;
use rusty_hands::camera::CameraSource;
use rusty_hands::classifier::classify;
use rusty_hands::config::AppConfig;
use rusty_hands::controller::TransformController;
use rusty_hands::detector::HandDetector;
use rusty_hands::scene::ParticleScene;
use rusty_hands::source::{spawn_source, DetectorSource, HandSource, SimulatedHandSource};
use rusty_hands::tracker::ModeTracker;
use rusty_hands::types::{GestureEvent, HandFrame};

fn create_source(args: &Args) -> anyhow::Result<Box<dyn HandSource>> {
    if args.simulate {
        println!("{}", "Simulated hand source (--simulate).".yellow());
        return Ok(Box::new(SimulatedHandSource::new()));
    }
    if !Path::new(&args.model).exists() {
        println!(
            "{}",
            format!("Model not found at {}. Falling back to simulated hand.", args.model).yellow()
        );
        return Ok(Box::new(SimulatedHandSource::new()));
    }

    let camera = CameraSource::new(args.cam_index, !args.no_mirror)?;
    let detector = HandDetector::new(&args.model)?;
    Ok(Box::new(DetectorSource::new(camera, detector)))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list {
        return CameraSource::print_available();
    }

    // 0. Load Config (validates the gesture tunables up front)
    let config = AppConfig::load()?;

    // 1. Hand source on its own thread
    let source = create_source(&args)?;
    println!("Active Source: {}", source.name());
    let frames: Receiver<HandFrame> = spawn_source(source);

    // 2. Scene window
    let mut scene = ParticleScene::new(&config.scene, &config.gesture)?;
    println!("Window created successfully.");

    // 3. Gesture state, all mutated from this thread only
    let mut tracker = ModeTracker::new();
    let mut controller = TransformController::new(config.gesture.clone());

    println!("Pinch and drag to rotate. Open the pinch to zoom. [Esc] quits.");

    let mut last_tick = Instant::now();
    let mut was_idle_spinning = true;

    // 4. Loop
    while scene.is_open() {
        // Drain to the freshest frame; a missed tick just means no update.
        let mut latest: Option<HandFrame> = None;
        while let Ok(frame) = frames.try_recv() {
            latest = Some(frame);
        }

        let event = match latest {
            Some(HandFrame::Tips { index_tip, thumb_tip }) => {
                let observed = classify(index_tip, thumb_tip, config.gesture.pinch_threshold);
                tracker.update(Some(observed))
            }
            Some(HandFrame::NoHand) => tracker.update(None),
            // Nothing arrived while we were rendering
            None => GestureEvent::None,
        };

        controller.tick(event, &mut scene);

        if was_idle_spinning && !controller.idle_spin_enabled() {
            was_idle_spinning = false;
            println!("{}", "Manual control engaged. Idle spin off.".green());
        }

        let dt = last_tick.elapsed().as_secs_f32().min(0.1);
        last_tick = Instant::now();
        scene.advance(dt);
        scene.render()?;
    }

    Ok(())
}
