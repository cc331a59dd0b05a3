use crate::color;
use crate::error::{invalid, require_finite, Result};
use crate::scene_params::{CloudParams, GalaxyParams};

// High density displays render points at most twice as large.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

pub fn pixel_ratio(device_pixel_ratio: f32) -> f32 {
    device_pixel_ratio.min(MAX_PIXEL_RATIO)
}

// This should match the uniform block of the galaxy point shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, zerocopy::FromBytes, zerocopy::AsBytes)]
pub struct GalaxyUniforms {
    pub size: f32,
    pub time: f32,
}

impl GalaxyUniforms {
    pub fn new(params: &GalaxyParams, device_pixel_ratio: f32) -> Result<Self> {
        let size = require_finite("size", params.size)?;
        Ok(GalaxyUniforms {
            size: size * pixel_ratio(device_pixel_ratio),
            time: 0.0,
        })
    }

    pub fn with_time(self, elapsed: std::time::Duration) -> Self {
        GalaxyUniforms {
            time: elapsed.as_secs_f32(),
            ..self
        }
    }
}

// This should match the uniform block of the cloud ray marching shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, zerocopy::FromBytes, zerocopy::AsBytes)]
pub struct CloudUniforms {
    pub base_color: [f32; 3],
    pub threshold: f32,
    pub opacity: f32,
    pub range: f32,
    pub steps: u32,
    pub _padding: u32,
}

impl CloudUniforms {
    pub fn new(params: &CloudParams) -> Result<Self> {
        if params.steps < 0 {
            return invalid(format!("steps must not be negative, got {}", params.steps));
        }
        Ok(CloudUniforms {
            base_color: color::to_array(color::parse_hex("base_color", &params.base_color)?),
            threshold: require_finite("threshold", params.threshold)?,
            opacity: require_finite("opacity", params.opacity)?,
            range: require_finite("range", params.range)?,
            steps: params.steps as u32,
            _padding: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::AsBytes;

    #[test]
    fn point_size_follows_pixel_ratio() {
        let params = GalaxyParams::default();
        assert_eq!(GalaxyUniforms::new(&params, 1.0).unwrap().size, 60.0);
        assert_eq!(GalaxyUniforms::new(&params, 1.5).unwrap().size, 90.0);
        assert_eq!(GalaxyUniforms::new(&params, 3.0).unwrap().size, 120.0);
    }

    #[test]
    fn time_advances() {
        let uniforms = GalaxyUniforms::new(&GalaxyParams::default(), 1.0)
            .unwrap()
            .with_time(std::time::Duration::from_millis(2500));
        assert_eq!(uniforms.time, 2.5);
        assert_eq!(uniforms.as_bytes().len(), 8);
    }

    #[test]
    fn cloud_defaults() {
        let uniforms = CloudUniforms::new(&CloudParams::default()).unwrap();
        assert_eq!(uniforms.steps, 100);
        assert_eq!(uniforms.threshold, 0.25);
        assert_eq!(uniforms.as_bytes().len(), 32);
    }

    #[test]
    fn cloud_rejects_bad_values() {
        assert!(CloudUniforms::new(&CloudParams {
            steps: -1,
            ..CloudParams::default()
        })
        .is_err());
        assert!(CloudUniforms::new(&CloudParams {
            base_color: "grey".to_string(),
            ..CloudParams::default()
        })
        .is_err());
    }
}
