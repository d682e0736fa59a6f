//! Decorative background animation. No data dependency.

use std::f32::consts::TAU;

use rand::Rng;

pub const PARTICLE_COUNT: usize = 50;
pub const BUBBLE_COUNT: usize = 50;
const BUBBLE_PREWARM_STEPS: usize = 1000;
/// A bubble this far above the top edge is recycled.
const BUBBLE_ESCAPE: f32 = -50.0;

// ---------------------------------------------------------------------------
// Drifting particles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub opacity: f32,
}

/// Slow drifting dots that bounce off the field edges.
#[derive(Debug, Clone)]
pub struct ParticleField {
    pub width: f32,
    pub height: f32,
    pub particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle {
                x: rng.gen::<f32>() * width,
                y: rng.gen::<f32>() * height,
                vx: (rng.gen::<f32>() - 0.5) * 0.5,
                vy: (rng.gen::<f32>() - 0.5) * 0.5,
                size: rng.gen::<f32>() * 2.0 + 1.0,
                opacity: rng.gen::<f32>() * 0.5 + 0.1,
            })
            .collect();
        Self {
            width,
            height,
            particles,
        }
    }

    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.x < 0.0 || p.x > self.width {
                p.vx = -p.vx;
            }
            if p.y < 0.0 || p.y > self.height {
                p.vy = -p.vy;
            }
        }
    }

    /// Adopt a new size; particles keep their positions and drift back in.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

// ---------------------------------------------------------------------------
// Rising bubbles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
    pub wobble: f32,
    pub wobble_speed: f32,
    pub opacity: f32,
}

impl Bubble {
    fn spawn<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        Self {
            x: rng.gen::<f32>() * width,
            y: height + rng.gen::<f32>() * 100.0,
            radius: rng.gen::<f32>() * 5.0 + 2.0,
            speed: rng.gen::<f32>() + 0.5,
            wobble: rng.gen::<f32>() * TAU,
            wobble_speed: rng.gen::<f32>() * 0.05,
            opacity: rng.gen::<f32>() * 0.5 + 0.1,
        }
    }
}

/// Bubbles rising from below the bottom edge, swaying sideways.
#[derive(Debug, Clone)]
pub struct BubbleField {
    pub width: f32,
    pub height: f32,
    pub bubbles: Vec<Bubble>,
}

impl BubbleField {
    /// A field already pre-warmed so bubbles are spread over the height.
    pub fn new<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        let mut field = Self {
            width,
            height,
            bubbles: Vec::new(),
        };
        field.reset(rng);
        field
    }

    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.bubbles = (0..BUBBLE_COUNT)
            .map(|_| Bubble::spawn(self.width, self.height, rng))
            .collect();
        for _ in 0..BUBBLE_PREWARM_STEPS {
            self.step(rng);
        }
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (width, height) = (self.width, self.height);
        for b in &mut self.bubbles {
            b.y -= b.speed;
            b.x += b.wobble.sin() * 0.5;
            b.wobble += b.wobble_speed;
            if b.y < BUBBLE_ESCAPE {
                *b = Bubble::spawn(width, height, rng);
            }
        }
    }

    /// Resizing re-seeds the whole field for the new bounds.
    pub fn resize<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) {
        self.width = width;
        self.height = height;
        self.reset(rng);
    }
}
