use anyhow::Result;
use glam::{EulerRot, Mat3, Vec3};

use crate::config::{parse_hex, GestureConfig, SceneConfig};
use crate::controller::RenderSink;
use crate::types::DensityLevel;

const TAU: f32 = std::f32::consts::TAU;

// =========================================================================
// Small deterministic RNG for particle emission
// =========================================================================

struct XorShift {
    state: u32,
}

impl XorShift {
    fn new(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

// =========================================================================
// Emitters
// =========================================================================

struct Particle {
    pos: Vec3,
    age: f32,
    life: f32,
}

enum EmitterShape {
    Sphere { radius: f32 },
    Torus { ring_radius: f32, pipe_radius: f32 },
}

impl EmitterShape {
    fn sample_surface(&self, rng: &mut XorShift) -> Vec3 {
        match *self {
            EmitterShape::Sphere { radius } => {
                // Uniform on the sphere surface
                let z = rng.next_f32() * 2.0 - 1.0;
                let theta = rng.next_f32() * TAU;
                let r = (1.0 - z * z).sqrt();
                Vec3::new(r * theta.cos(), r * theta.sin(), z) * radius
            }
            EmitterShape::Torus {
                ring_radius,
                pipe_radius,
            } => {
                let theta = rng.next_f32() * TAU;
                let phi = rng.next_f32() * TAU;
                let rim = ring_radius + pipe_radius * phi.cos();
                Vec3::new(rim * theta.cos(), pipe_radius * phi.sin(), rim * theta.sin())
            }
        }
    }
}

struct Emitter {
    shape: EmitterShape,
    birth_rate: f32,
    life_span: f32,
    color: (u8, u8, u8),
    /// Fixed local orientation of the emitter (the ring's tilt).
    tilt: Mat3,
    particles: Vec<Particle>,
    birth_carry: f32,
}

impl Emitter {
    fn new(shape: EmitterShape, birth_rate: f32, life_span: f32, color: (u8, u8, u8), tilt: Vec3) -> Self {
        Self {
            shape,
            birth_rate,
            life_span,
            color,
            tilt: Mat3::from_euler(EulerRot::XYZ, tilt.x, tilt.y, tilt.z),
            particles: Vec::new(),
            birth_carry: 0.0,
        }
    }

    /// Steady-state population for the current birth rate, with headroom
    /// for the lifetime scatter.
    fn population_cap(&self) -> usize {
        ((self.birth_rate * self.life_span * 1.25) as usize).max(1024)
    }

    fn advance(&mut self, dt: f32, rng: &mut XorShift) {
        for p in &mut self.particles {
            p.age += dt;
        }
        self.particles.retain(|p| p.age < p.life);

        self.birth_carry += self.birth_rate * dt;
        let mut births = self.birth_carry as usize;
        self.birth_carry -= births as f32;

        // A long stall would otherwise dump a huge burst on the next frame
        births = births.min(self.population_cap().saturating_sub(self.particles.len()));

        for _ in 0..births {
            let pos = self.tilt * self.shape.sample_surface(rng);
            // Slight lifetime scatter so deaths don't pulse
            let life = self.life_span * (0.75 + rng.next_f32() * 0.5);
            self.particles.push(Particle { pos, age: 0.0, life });
        }
    }
}

// =========================================================================
// ParticleScene: the render sink
// =========================================================================

/// Software particle renderer. Owns the window, both particle systems and
/// the idle-spin animation; consumes transform snapshots from the
/// controller and never reads back.
pub struct ParticleScene {
    window: minifb::Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,

    rng: XorShift,
    core: Emitter,
    ring: Emitter,

    // Snapshot state pushed through RenderSink
    orientation: Vec3,
    scale: f32,
    idle_spin: bool,

    /// Accumulated idle rotation, kept apart from the controller-driven
    /// orientation so manual control takes over from the visible pose.
    idle_angle: f32,
    idle_rate: f32,
    camera_distance: f32,
    dense_birth_rate: f32,
    sparse_birth_rate: f32,
}

impl ParticleScene {
    pub fn new(scene: &SceneConfig, gesture: &GestureConfig) -> Result<Self> {
        let mut window = minifb::Window::new(
            "Rusty Hands",
            scene.window_width,
            scene.window_height,
            minifb::WindowOptions::default(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_micros(16600))); // ~60 FPS

        let core = Emitter::new(
            EmitterShape::Sphere { radius: 1.0 },
            gesture.sparse_birth_rate,
            scene.core_life_span,
            parse_hex(&scene.core_color_hex),
            Vec3::ZERO,
        );
        let ring = Emitter::new(
            EmitterShape::Torus {
                ring_radius: 2.5,
                pipe_radius: 0.2,
            },
            scene.ring_birth_rate,
            scene.ring_life_span,
            parse_hex(&scene.ring_color_hex),
            Vec3::new(0.5, 0.0, 0.2),
        );

        Ok(Self {
            window,
            buffer: vec![0; scene.window_width * scene.window_height],
            width: scene.window_width,
            height: scene.window_height,
            rng: XorShift::new(0x5EED_5EED),
            core,
            ring,
            orientation: Vec3::ZERO,
            scale: 1.0,
            idle_spin: true,
            idle_angle: 0.0,
            idle_rate: TAU / scene.idle_spin_period.max(0.1),
            camera_distance: scene.camera_distance,
            dense_birth_rate: gesture.dense_birth_rate,
            sparse_birth_rate: gesture.sparse_birth_rate,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    /// Advance the scene's own animation domain: idle spin and particle
    /// birth/aging.
    pub fn advance(&mut self, dt: f32) {
        if self.idle_spin {
            self.idle_angle += self.idle_rate * dt;
        }
        self.core.advance(dt, &mut self.rng);
        self.ring.advance(dt, &mut self.rng);
    }

    pub fn render(&mut self) -> Result<()> {
        self.buffer.fill(0);

        let rot = Mat3::from_euler(
            EulerRot::YXZ,
            self.orientation.y + self.idle_angle,
            self.orientation.x,
            0.0,
        );
        let scale = self.scale;
        let cam_z = self.camera_distance;
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        let focal = self.height as f32; // ~53 degree vertical FOV

        let (width, height) = (self.width, self.height);
        let buffer = &mut self.buffer;

        for emitter in [&self.core, &self.ring] {
            let (er, eg, eb) = emitter.color;
            for p in &emitter.particles {
                let world = rot * (p.pos * scale);
                let depth = cam_z - world.z;
                if depth < 0.1 {
                    continue;
                }
                let px = cx + world.x * focal / depth;
                let py = cy - world.y * focal / depth;
                if px < 0.0 || py < 0.0 {
                    continue;
                }
                let (px, py) = (px as usize, py as usize);
                if px >= width || py >= height {
                    continue;
                }

                // Fade out over the particle's life, additive blend
                let fade = 1.0 - p.age / p.life;
                let idx = py * width + px;
                let old = buffer[idx];
                let r = (((old >> 16) & 0xFF) + (er as f32 * fade) as u32).min(255);
                let g = (((old >> 8) & 0xFF) + (eg as f32 * fade) as u32).min(255);
                let b = ((old & 0xFF) + (eb as f32 * fade) as u32).min(255);
                buffer[idx] = (r << 16) | (g << 8) | b;
            }
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| anyhow::anyhow!("Window update failed: {}", e))
    }
}

impl RenderSink for ParticleScene {
    fn set_orientation(&mut self, euler_x: f32, euler_y: f32) {
        self.orientation.x = euler_x;
        self.orientation.y = euler_y;
    }

    fn set_scale(&mut self, factor: f32) {
        self.scale = factor;
    }

    fn set_density(&mut self, level: DensityLevel) {
        self.core.birth_rate = match level {
            DensityLevel::Dense => self.dense_birth_rate,
            DensityLevel::Sparse => self.sparse_birth_rate,
        };
    }

    fn set_idle_spin(&mut self, enabled: bool) {
        // One-way: once manual control begins the idle animation never
        // comes back for the session.
        if !enabled {
            self.idle_spin = false;
        }
    }
}
