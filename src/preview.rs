use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::cloud::DensityVolume;
use crate::galaxy::ParticleSet;
use crate::material::{CloudUniforms, GalaxyUniforms};
use crate::scene::{LayerKind, RenderBackend};

// Largest edge of a galaxy preview, in pixels.
pub const MAX_PREVIEW_SIZE: u32 = 4096;

pub fn clamp_preview_size(size: u32) -> u32 {
    if size > MAX_PREVIEW_SIZE {
        log::warn!(
            "Preview size {} is too large, using {}",
            size,
            MAX_PREVIEW_SIZE
        );
    }
    size.max(1).min(MAX_PREVIEW_SIZE)
}

// Offline stand-in for the GPU renderer: rasterizes uploaded layers into
// images so a scene can be inspected without a window.
pub struct ImageBackend {
    size: u32,
    color_map: i32,
    next_handle: u64,
    images: BTreeMap<u64, (LayerKind, image::RgbImage)>,
}

impl ImageBackend {
    pub fn new(size: u32, color_map: i32) -> Self {
        ImageBackend {
            size: clamp_preview_size(size),
            color_map,
            next_handle: 0,
            images: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image(&self, kind: LayerKind) -> Option<&image::RgbImage> {
        self.images
            .values()
            .find(|(k, _)| *k == kind)
            .map(|(_, image)| image)
    }

    fn insert(&mut self, kind: LayerKind, image: image::RgbImage) -> u64 {
        self.next_handle += 1;
        self.images.insert(self.next_handle, (kind, image));
        self.next_handle
    }

    // Writes every live image as `<kind>.png` under `dir`.
    pub fn save_all(&self, dir: &Path) -> image::ImageResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (kind, image) in self.images.values() {
            let name = match kind {
                LayerKind::Galaxy => "galaxy.png",
                LayerKind::Cloud => "cloud.png",
            };
            let path = dir.join(name);
            image.save(&path)?;
            info!("Wrote {:?} preview to {}", kind, path.display());
            written.push(path);
        }
        Ok(written)
    }
}

// Top down additive splat of the displaced particles, weighted by scale.
pub fn render_particles(particles: &ParticleSet, size: u32) -> image::RgbImage {
    let size = clamp_preview_size(size);
    let displaced: Vec<([f32; 3], f32, f32)> = particles
        .iter()
        .map(|p| {
            let x = p.position[0] + p.randomness[0];
            let z = p.position[2] + p.randomness[2];
            (p.color, x, z)
        })
        .collect();
    let extent = displaced
        .iter()
        .map(|(_, x, z)| x.abs().max(z.abs()))
        .fold(std::f32::EPSILON, f32::max);

    let pixels = size as usize * size as usize;
    let mut accum = vec![0.0f32; pixels * 3];
    let scales = particles.scales();
    for (i, (color, x, z)) in displaced.iter().enumerate() {
        let to_pixel = |v: f32| {
            let t = (v / extent + 1.0) / 2.0;
            ((t * size as f32) as u32).min(size - 1) as usize
        };
        let offset = (to_pixel(*z) * size as usize + to_pixel(*x)) * 3;
        for c in 0..3 {
            accum[offset + c] += color[c] * scales[i];
        }
    }
    let data = accum
        .iter()
        .map(|v| (v.max(0.0).min(1.0) * 255.0) as u8)
        .collect();
    image::RgbImage::from_raw(size, size, data).unwrap_or_else(|| image::RgbImage::new(size, size))
}

// The middle z layer of the volume through a color map. Cells under the
// shader threshold stay black.
pub fn render_volume_slice(
    volume: &DensityVolume,
    uniforms: &CloudUniforms,
    color_map: i32,
) -> image::RgbImage {
    let (width, height, depth) = volume.dimensions();
    let cm = crate::color_maps::get_color_map_from_index(color_map);
    let cutoff = (uniforms.threshold.max(0.0).min(1.0) * 255.0) as u8;
    let slice = volume.slice(depth / 2).unwrap_or(&[]);
    image::RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let density = slice
            .get(x as usize + y as usize * width)
            .copied()
            .unwrap_or(0);
        if density < cutoff {
            image::Rgb([0, 0, 0])
        } else {
            image::Rgb(crate::color_maps::density_color(cm, density))
        }
    })
}

impl RenderBackend for ImageBackend {
    type Handle = u64;

    fn upload_particles(&mut self, particles: &ParticleSet, _uniforms: &GalaxyUniforms) -> u64 {
        let image = render_particles(particles, self.size);
        self.insert(LayerKind::Galaxy, image)
    }

    fn upload_volume(&mut self, volume: &DensityVolume, uniforms: &CloudUniforms) -> u64 {
        let image = render_volume_slice(volume, uniforms, self.color_map);
        self.insert(LayerKind::Cloud, image)
    }

    fn release(&mut self, handle: u64) {
        self.images.remove(&handle);
    }
}
