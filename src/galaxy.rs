use std::f32::consts::PI;

use log::info;
use rand::Rng;
use zerocopy::AsBytes;

use crate::color::{self, Rgb};
use crate::error::{invalid, require_finite, Error, Result};
use crate::scene_params::GalaxyParams;

// Validated form of `GalaxyParams`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalaxyShape {
    pub count: usize,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub scale_range: f32,
    pub inside_color: Rgb,
    pub outside_color: Rgb,
}

impl std::convert::TryFrom<&GalaxyParams> for GalaxyShape {
    type Error = Error;

    fn try_from(params: &GalaxyParams) -> Result<Self> {
        if params.count < 0 {
            return invalid(format!("count must not be negative, got {}", params.count));
        }
        // The three-float attributes are the largest buffers.
        let bytes = (params.count as u64).checked_mul(3 * std::mem::size_of::<f32>() as u64);
        if bytes.map_or(true, |n| n > isize::MAX as u64) {
            return invalid(format!("count {} is too large", params.count));
        }
        if params.branches < 1 {
            return invalid(format!("branches must be at least 1, got {}", params.branches));
        }
        let radius = require_finite("radius", params.radius)?;
        if radius <= 0.0 {
            return invalid(format!("radius must be positive, got {}", radius));
        }
        require_finite("size", params.size)?;
        Ok(GalaxyShape {
            count: params.count as usize,
            radius,
            branches: params.branches as u32,
            spin: require_finite("spin", params.spin)?,
            randomness: require_finite("randomness", params.randomness)?,
            randomness_power: require_finite("randomness_power", params.randomness_power)?,
            scale_range: require_finite("scale_range", params.scale_range)?,
            inside_color: color::parse_hex("inside_color", &params.inside_color)?,
            outside_color: color::parse_hex("outside_color", &params.outside_color)?,
        })
    }
}

// Base angle of the arm particle `index` belongs to.
pub fn branch_angle(index: usize, branches: u32) -> f32 {
    let branches = branches as usize;
    ((index % branches) as f32 / branches as f32) * 2.0 * PI
}

// The random numbers consumed by one particle, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleDraws {
    pub radius: f32,
    pub offsets: [f32; 3],
    pub positive: [bool; 3],
    pub scale: f32,
}

impl ParticleDraws {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let radius = rng.gen::<f32>();
        let mut offsets = [0.0; 3];
        let mut positive = [true; 3];
        for axis in 0..3 {
            offsets[axis] = rng.gen::<f32>();
            positive[axis] = rng.gen_bool(0.5);
        }
        let scale = rng.gen::<f32>();
        ParticleDraws {
            radius,
            offsets,
            positive,
            scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub scale: f32,
    pub randomness: [f32; 3],
}

pub fn place_particle(shape: &GalaxyShape, index: usize, draws: &ParticleDraws) -> Particle {
    let radius = draws.radius * shape.radius;
    let angle = branch_angle(index, shape.branches) + radius * shape.spin;

    let mut randomness = [0.0; 3];
    for axis in 0..3 {
        let sign = if draws.positive[axis] { 1.0 } else { -1.0 };
        randomness[axis] =
            draws.offsets[axis].powf(shape.randomness_power) * sign * shape.randomness;
    }

    let mixed = color::lerp(shape.inside_color, shape.outside_color, radius / shape.radius);
    Particle {
        position: [angle.cos() * radius, 0.0, angle.sin() * radius],
        color: color::to_array(mixed),
        scale: draws.scale * shape.scale_range,
        randomness,
    }
}

// Four parallel attribute arrays, laid out the way the point shader reads
// them: `position` and `color` and `randomness` hold three floats per
// particle, `scale` one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    positions: Vec<f32>,
    colors: Vec<f32>,
    scales: Vec<f32>,
    randomness: Vec<f32>,
}

impl ParticleSet {
    fn with_capacity(count: usize) -> Self {
        ParticleSet {
            positions: Vec::with_capacity(count * 3),
            colors: Vec::with_capacity(count * 3),
            scales: Vec::with_capacity(count),
            randomness: Vec::with_capacity(count * 3),
        }
    }

    fn push(&mut self, particle: &Particle) {
        self.positions.extend_from_slice(&particle.position);
        self.colors.extend_from_slice(&particle.color);
        self.scales.push(particle.scale);
        self.randomness.extend_from_slice(&particle.randomness);
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn randomness(&self) -> &[f32] {
        &self.randomness
    }

    pub fn get(&self, index: usize) -> Option<Particle> {
        if index >= self.len() {
            return None;
        }
        let i3 = index * 3;
        let triple = |v: &[f32]| [v[i3], v[i3 + 1], v[i3 + 2]];
        Some(Particle {
            position: triple(&self.positions[..]),
            color: triple(&self.colors[..]),
            scale: self.scales[index],
            randomness: triple(&self.randomness[..]),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    // Raw attribute bytes, ready for a vertex buffer upload.
    pub fn position_bytes(&self) -> &[u8] {
        self.positions.as_slice().as_bytes()
    }

    pub fn color_bytes(&self) -> &[u8] {
        self.colors.as_slice().as_bytes()
    }

    pub fn scale_bytes(&self) -> &[u8] {
        self.scales.as_slice().as_bytes()
    }

    pub fn randomness_bytes(&self) -> &[u8] {
        self.randomness.as_slice().as_bytes()
    }
}

// Particles are dealt round-robin onto the arms and twisted by `spin` in
// proportion to their distance from the center.
pub fn generate_with<R: Rng + ?Sized>(shape: &GalaxyShape, rng: &mut R) -> ParticleSet {
    let mut particles = ParticleSet::with_capacity(shape.count);
    for i in 0..shape.count {
        let draws = ParticleDraws::sample(rng);
        particles.push(&place_particle(shape, i, &draws));
    }
    info!(
        "Generated {} particles on {} branches",
        particles.len(),
        shape.branches
    );
    particles
}

pub fn generate(shape: &GalaxyShape) -> ParticleSet {
    generate_with(shape, &mut rand::thread_rng())
}
