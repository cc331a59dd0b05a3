use std::collections::BTreeMap;
use std::convert::TryFrom;

use log::{debug, info};
use rand::Rng;

use crate::cloud::{self, CloudShape, DensityVolume};
use crate::error::Result;
use crate::galaxy::{self, GalaxyShape, ParticleSet};
use crate::material::{CloudUniforms, GalaxyUniforms};
use crate::noise::NoiseSource;
use crate::scene_params::{CloudParams, GalaxyParams, SceneParams};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerKind {
    Galaxy,
    Cloud,
}

// Whatever turns generated buffers into something drawable. Handles are
// opaque to the scene and handed back exactly once through `release`.
pub trait RenderBackend {
    type Handle;

    fn upload_particles(&mut self, particles: &ParticleSet, uniforms: &GalaxyUniforms)
        -> Self::Handle;
    fn upload_volume(&mut self, volume: &DensityVolume, uniforms: &CloudUniforms)
        -> Self::Handle;
    fn release(&mut self, handle: Self::Handle);
}

pub enum LayerData {
    Galaxy(ParticleSet, GalaxyUniforms),
    Cloud(DensityVolume, CloudUniforms),
}

impl LayerData {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerData::Galaxy(..) => LayerKind::Galaxy,
            LayerData::Cloud(..) => LayerKind::Cloud,
        }
    }
}

struct Layer<H> {
    data: LayerData,
    handle: H,
}

// Holds at most one live layer per `LayerKind`. Replacing a layer validates
// and builds the new data first, then releases the old backend handle before
// uploading, so the backend never holds two generations of the same kind.
pub struct Scene<B: RenderBackend> {
    backend: B,
    pixel_ratio: f32,
    layers: BTreeMap<LayerKind, Layer<B::Handle>>,
}

impl<B: RenderBackend> Scene<B> {
    pub fn new(backend: B, pixel_ratio: f32) -> Self {
        Scene {
            backend,
            pixel_ratio,
            layers: BTreeMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn contains(&self, kind: LayerKind) -> bool {
        self.layers.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = LayerKind> + '_ {
        self.layers.keys().copied()
    }

    pub fn particles(&self) -> Option<&ParticleSet> {
        match self.layers.get(&LayerKind::Galaxy).map(|l| &l.data) {
            Some(LayerData::Galaxy(particles, _)) => Some(particles),
            _ => None,
        }
    }

    pub fn volume(&self) -> Option<&DensityVolume> {
        match self.layers.get(&LayerKind::Cloud).map(|l| &l.data) {
            Some(LayerData::Cloud(volume, _)) => Some(volume),
            _ => None,
        }
    }

    // Releases the previous layer of the same kind, then uploads `data`.
    fn replace(&mut self, data: LayerData) {
        let kind = data.kind();
        self.remove(kind);
        let handle = match &data {
            LayerData::Galaxy(particles, uniforms) => {
                self.backend.upload_particles(particles, uniforms)
            }
            LayerData::Cloud(volume, uniforms) => self.backend.upload_volume(volume, uniforms),
        };
        debug!("Uploaded {:?} layer", kind);
        self.layers.insert(kind, Layer { data, handle });
    }

    pub fn regenerate_galaxy<R: Rng + ?Sized>(
        &mut self,
        params: &GalaxyParams,
        rng: &mut R,
    ) -> Result<()> {
        let shape = GalaxyShape::try_from(params)?;
        let uniforms = GalaxyUniforms::new(params, self.pixel_ratio)?;
        let particles = galaxy::generate_with(&shape, rng);
        self.replace(LayerData::Galaxy(particles, uniforms));
        Ok(())
    }

    pub fn regenerate_cloud<N: NoiseSource + ?Sized>(
        &mut self,
        params: &CloudParams,
        noise: &N,
    ) -> Result<()> {
        let shape = CloudShape::try_from(params)?;
        let uniforms = CloudUniforms::new(params)?;
        let volume = cloud::bake(&shape, noise);
        self.replace(LayerData::Cloud(volume, uniforms));
        Ok(())
    }

    // Like `regenerate_cloud` with Perlin noise from the configured seed, or
    // one drawn from `rng`.
    pub fn regenerate_cloud_seeded<R: Rng + ?Sized>(
        &mut self,
        params: &CloudParams,
        rng: &mut R,
    ) -> Result<()> {
        let shape = CloudShape::try_from(params)?;
        let uniforms = CloudUniforms::new(params)?;
        let volume = cloud::bake_seeded(&shape, rng);
        self.replace(LayerData::Cloud(volume, uniforms));
        Ok(())
    }

    // Brings the scene in line with `params`: disabled layers are removed,
    // enabled layers are regenerated. Clouds use Perlin noise seeded from
    // `rng` unless the config pins a seed.
    pub fn apply<R: Rng + ?Sized>(&mut self, params: &SceneParams, rng: &mut R) -> Result<()> {
        // Validate everything up front so a bad cloud doesn't leave a fresh
        // galaxy next to a stale cloud.
        if params.enable_galaxy {
            GalaxyShape::try_from(&params.galaxy)?;
            GalaxyUniforms::new(&params.galaxy, self.pixel_ratio)?;
        }
        if params.enable_cloud {
            CloudShape::try_from(&params.cloud)?;
            CloudUniforms::new(&params.cloud)?;
        }

        if params.enable_galaxy {
            self.regenerate_galaxy(&params.galaxy, rng)?;
        } else {
            self.remove(LayerKind::Galaxy);
        }
        if params.enable_cloud {
            self.regenerate_cloud_seeded(&params.cloud, rng)?;
        } else {
            self.remove(LayerKind::Cloud);
        }
        info!(
            "Scene now holds {:?}",
            self.kinds().collect::<Vec<LayerKind>>()
        );
        Ok(())
    }

    pub fn remove(&mut self, kind: LayerKind) -> bool {
        match self.layers.remove(&kind) {
            Some(layer) => {
                debug!("Releasing {:?} layer", kind);
                self.backend.release(layer.handle);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        let kinds: Vec<LayerKind> = self.kinds().collect();
        for kind in kinds {
            self.remove(kind);
        }
    }
}

impl<B: RenderBackend> Drop for Scene<B> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Particles(usize),
        Volume(usize),
        Release(u32),
    }

    #[derive(Default)]
    struct Recorder {
        next: u32,
        events: Rc<RefCell<Vec<Event>>>,
    }

    impl RenderBackend for Recorder {
        type Handle = u32;

        fn upload_particles(&mut self, particles: &ParticleSet, _: &GalaxyUniforms) -> u32 {
            self.events.borrow_mut().push(Event::Particles(particles.len()));
            self.next += 1;
            self.next
        }

        fn upload_volume(&mut self, volume: &DensityVolume, _: &CloudUniforms) -> u32 {
            self.events.borrow_mut().push(Event::Volume(volume.len()));
            self.next += 1;
            self.next
        }

        fn release(&mut self, handle: u32) {
            self.events.borrow_mut().push(Event::Release(handle));
        }
    }

    fn scene() -> (Scene<Recorder>, Rc<RefCell<Vec<Event>>>) {
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        (Scene::new(recorder, 1.0), events)
    }

    fn small_cloud() -> CloudParams {
        CloudParams {
            width: 4,
            height: 4,
            depth: 4,
            ..CloudParams::default()
        }
    }

    #[test]
    fn replacing_releases_previous_first() {
        let (mut scene, events) = scene();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let params = GalaxyParams {
            count: 10,
            ..GalaxyParams::default()
        };
        scene.regenerate_galaxy(&params, &mut rng).unwrap();
        scene.regenerate_galaxy(&params, &mut rng).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![Event::Particles(10), Event::Release(1), Event::Particles(10)]
        );
        assert_eq!(scene.particles().map(|p| p.len()), Some(10));
    }

    #[test]
    fn invalid_params_keep_current_layer() {
        let (mut scene, events) = scene();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        scene
            .regenerate_galaxy(&GalaxyParams::default(), &mut rng)
            .unwrap();
        let bad = GalaxyParams {
            branches: 0,
            ..GalaxyParams::default()
        };
        assert!(scene.regenerate_galaxy(&bad, &mut rng).is_err());
        assert_eq!(events.borrow().len(), 1);
        assert!(scene.contains(LayerKind::Galaxy));
    }

    #[test]
    fn flags_add_and_remove_layers() {
        let (mut scene, events) = scene();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut params = SceneParams {
            enable_galaxy: true,
            enable_cloud: true,
            cloud: small_cloud(),
            galaxy: GalaxyParams {
                count: 5,
                ..GalaxyParams::default()
            },
            ..SceneParams::default()
        };
        scene.apply(&params, &mut rng).unwrap();
        assert!(scene.contains(LayerKind::Galaxy));
        assert_eq!(scene.volume().map(|v| v.len()), Some(64));

        params.enable_galaxy = false;
        scene.apply(&params, &mut rng).unwrap();
        assert!(!scene.contains(LayerKind::Galaxy));
        assert!(scene.particles().is_none());
        assert!(scene.contains(LayerKind::Cloud));
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Particles(5),
                Event::Volume(64),
                Event::Release(1),
                Event::Release(2),
                Event::Volume(64),
            ]
        );
    }

    #[test]
    fn apply_validates_before_touching_layers() {
        let (mut scene, events) = scene();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let params = SceneParams {
            enable_cloud: true,
            cloud: CloudParams {
                width: -2,
                ..small_cloud()
            },
            ..SceneParams::default()
        };
        assert!(scene.apply(&params, &mut rng).is_err());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn drop_releases_everything() {
        let (mut scene, events) = scene();
        scene
            .regenerate_cloud(&small_cloud(), &|_: f32, _: f32, _: f32| 0.0f32)
            .unwrap();
        scene
            .regenerate_galaxy(
                &GalaxyParams {
                    count: 0,
                    ..GalaxyParams::default()
                },
                &mut rand::thread_rng(),
            )
            .unwrap();
        drop(scene);
        let events = events.borrow();
        assert_eq!(events.len(), 4);
        assert!(events.contains(&Event::Release(1)));
        assert!(events.contains(&Event::Release(2)));
    }

    #[test]
    fn pinned_cloud_seed_survives_regeneration() {
        let (mut scene, _) = scene();
        let params = CloudParams {
            seed: Some(12),
            ..small_cloud()
        };
        scene
            .regenerate_cloud_seeded(&params, &mut rand::rngs::StdRng::seed_from_u64(1))
            .unwrap();
        let first = scene.volume().cloned().unwrap();
        scene
            .regenerate_cloud_seeded(&params, &mut rand::rngs::StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(scene.volume(), Some(&first));
    }

    #[test]
    fn remove_missing_layer_is_noop() {
        let (mut scene, events) = scene();
        assert!(!scene.remove(LayerKind::Cloud));
        assert!(events.borrow().is_empty());
    }
}
