use serde::{Deserialize, Serialize};

// Parameters that define the scene. Every field maps to a control on the
// tweaking panel; changing any of them regenerates the owning layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SceneParams {
    pub enable_galaxy: bool,
    pub enable_cloud: bool,
    pub color_map: i32,
    pub preview_size: u32,

    #[serde(default)]
    pub galaxy: GalaxyParams,

    #[serde(default)]
    pub cloud: CloudParams,
}

// Raw galaxy parameters as they come off the panel or the config file.
// Signed fields are validated by `GalaxyShape::try_from`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GalaxyParams {
    pub count: i64,
    pub size: f32,
    pub radius: f32,
    pub branches: i32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub scale_range: f32,
    pub inside_color: String,
    pub outside_color: String,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        GalaxyParams {
            count: 1000,
            size: 60.0,
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.6,
            randomness_power: 2.7,
            scale_range: 1.0,
            inside_color: "#ff6030".to_string(),
            outside_color: "#1b3984".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CloudParams {
    pub width: i64,
    pub height: i64,
    pub depth: i64,
    pub noise_scale: f32,
    // 1.5 gives the elongated cloud.
    pub x_stretch: f32,
    pub falloff_exponent: i32,

    pub base_color: String,
    pub threshold: f32,
    pub opacity: f32,
    pub range: f32,
    pub steps: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CloudParams {
    fn default() -> Self {
        CloudParams {
            width: 128,
            height: 128,
            depth: 128,
            noise_scale: 0.05,
            x_stretch: 1.0,
            falloff_exponent: 2,
            base_color: "#798aa0".to_string(),
            threshold: 0.25,
            opacity: 0.25,
            range: 0.1,
            steps: 100,
            seed: None,
        }
    }
}

impl std::str::FromStr for SceneParams {
    type Err = toml::de::Error;
    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let params = toml::from_str(serialized)?;
        Ok(params)
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        SceneParams {
            enable_galaxy: true,
            enable_cloud: false,
            color_map: 0,
            preview_size: 512,
            galaxy: GalaxyParams::default(),
            cloud: CloudParams::default(),
        }
    }
}

pub fn get_scene_config_from_default_file() -> SceneParams {
    let config_data = include_str!("../scene_config.toml");
    match config_data.parse() {
        Ok(params) => params,
        Err(e) => {
            log::error!(
                "Failed to parse config file({}): {:?}",
                "../scene_config.toml",
                e
            );
            SceneParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let params = SceneParams {
            enable_galaxy: true,
            enable_cloud: true,
            color_map: 2,
            preview_size: 256,
            galaxy: GalaxyParams {
                count: 10000,
                branches: 5,
                ..GalaxyParams::default()
            },
            cloud: CloudParams {
                x_stretch: 1.5,
                seed: Some(7),
                ..CloudParams::default()
            },
        };
        let serialized = toml::to_string(&params).unwrap();
        println!("serialized = {}", serialized);
        let deserialized: SceneParams = toml::from_str(&serialized).unwrap();
        println!("deserialized = {:?}", deserialized);
        assert_eq!(params, deserialized);
    }

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let params: SceneParams = "enable_galaxy = true\n\
                                   enable_cloud = false\n\
                                   color_map = 1\n\
                                   preview_size = 64\n"
            .parse()
            .unwrap();
        assert_eq!(params.galaxy, GalaxyParams::default());
        assert_eq!(params.cloud, CloudParams::default());
        assert_eq!(params.cloud.seed, None);
    }

    #[test]
    fn default_file_parses() {
        let params = get_scene_config_from_default_file();
        assert!(params.enable_galaxy);
        assert_eq!(params.galaxy.inside_color, "#ff6030");
        assert_eq!(params.cloud.falloff_exponent, 2);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        assert!("enable_galaxy = maybe".parse::<SceneParams>().is_err());
    }
}
