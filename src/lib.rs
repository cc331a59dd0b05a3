pub mod cloud;
pub mod color;
pub mod color_maps;
pub mod error;
pub mod galaxy;
pub mod material;
pub mod noise;
pub mod preview;
pub mod scene;
pub mod scene_params;

pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal() {
        let params = scene_params::get_scene_config_from_default_file();
        let mut scene = scene::Scene::new(preview::ImageBackend::new(32, params.color_map), 1.0);
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
        let small = scene_params::SceneParams {
            cloud: scene_params::CloudParams {
                width: 8,
                height: 8,
                depth: 8,
                ..params.cloud.clone()
            },
            ..params
        };
        scene.apply(&small, &mut rng).unwrap();
        assert_eq!(scene.backend().len(), 2);
    }
}
