use cgmath::InnerSpace;
use log::info;
use rand::Rng;

use crate::error::{invalid, require_finite, Error, Result};
use crate::noise::{NoiseSource, Perlin};
use crate::scene_params::CloudParams;

// Validated form of the grid half of `CloudParams`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudShape {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub noise_scale: f32,
    pub x_stretch: f32,
    pub falloff_exponent: i32,
    pub seed: Option<u64>,
}

impl CloudShape {
    pub fn cube(size: usize) -> Self {
        CloudShape {
            width: size,
            height: size,
            depth: size,
            noise_scale: 0.05,
            x_stretch: 1.0,
            falloff_exponent: 2,
            seed: None,
        }
    }

    pub fn len(&self) -> usize {
        self.width * self.height * self.depth
    }
}

fn dimension(name: &str, value: i64) -> Result<usize> {
    if value < 0 {
        return invalid(format!("{} must not be negative, got {}", name, value));
    }
    if value as u64 > usize::MAX as u64 {
        return invalid(format!("{} {} is too large", name, value));
    }
    Ok(value as usize)
}

impl std::convert::TryFrom<&CloudParams> for CloudShape {
    type Error = Error;

    fn try_from(params: &CloudParams) -> Result<Self> {
        let width = dimension("width", params.width)?;
        let height = dimension("height", params.height)?;
        let depth = dimension("depth", params.depth)?;
        let cells = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(depth));
        if cells.map_or(true, |n| n > isize::MAX as usize) {
            return invalid(format!(
                "volume {}x{}x{} does not fit in memory",
                width, height, depth
            ));
        }
        if params.falloff_exponent < 0 {
            return invalid(format!(
                "falloff_exponent must not be negative, got {}",
                params.falloff_exponent
            ));
        }
        Ok(CloudShape {
            width,
            height,
            depth,
            noise_scale: require_finite("noise_scale", params.noise_scale)?,
            x_stretch: require_finite("x_stretch", params.x_stretch)?,
            falloff_exponent: params.falloff_exponent,
            seed: params.seed,
        })
    }
}

// Immutable once baked. Cell (x, y, z) lives at `x + y * width + z * width * height`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityVolume {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<u8>,
}

impl DensityVolume {
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.width + z * self.width * self.height
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || z >= self.depth {
            return None;
        }
        Some(self.data[self.index(x, y, z)])
    }

    // One z layer, row major.
    pub fn slice(&self, z: usize) -> Option<&[u8]> {
        if z >= self.depth {
            return None;
        }
        let layer = self.width * self.height;
        Some(&self.data[z * layer..(z + 1) * layer])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// Distance falloff for a cell: 1 at the center, shrinking towards the corners.
pub fn falloff(shape: &CloudShape, x: usize, y: usize, z: usize) -> f32 {
    let centered = |v: usize, extent: usize| {
        let extent = extent as f32;
        (v as f32 - extent / 2.0) / extent
    };
    let offset = cgmath::Vector3::new(
        centered(x, shape.width),
        centered(y, shape.height),
        centered(z, shape.depth),
    );
    1.0 - offset.magnitude()
}

pub fn density_sample(noise: f32, falloff: f32, exponent: i32) -> u8 {
    let value = (128.0 + 128.0 * noise) * falloff.powi(exponent);
    value.max(0.0).min(255.0) as u8
}

pub fn bake<N: NoiseSource + ?Sized>(shape: &CloudShape, noise: &N) -> DensityVolume {
    let start = std::time::Instant::now();
    let mut data = vec![0u8; shape.len()];
    let mut i = 0;
    for z in 0..shape.depth {
        for y in 0..shape.height {
            for x in 0..shape.width {
                let d = falloff(shape, x, y, z);
                let n = noise.noise(
                    x as f32 * shape.noise_scale * shape.x_stretch,
                    y as f32 * shape.noise_scale,
                    z as f32 * shape.noise_scale,
                );
                data[i] = density_sample(n, d, shape.falloff_exponent);
                i += 1;
            }
        }
    }
    info!(
        "Baked {}x{}x{} density volume in {:?}",
        shape.width,
        shape.height,
        shape.depth,
        start.elapsed()
    );
    DensityVolume {
        width: shape.width,
        height: shape.height,
        depth: shape.depth,
        data,
    }
}

// Bakes with Perlin noise from the configured seed, or one drawn from `rng`.
pub fn bake_seeded<R: Rng + ?Sized>(shape: &CloudShape, rng: &mut R) -> DensityVolume {
    bake(shape, &Perlin::seeded_or(shape.seed, rng))
}
