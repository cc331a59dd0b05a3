use lazy_static::lazy_static;

// Index of viridis in `COLOR_MAPS`.
const FALLBACK_COLOR_MAP: usize = 0;

lazy_static! {
    // Indexed by the `color_map` config field: viridis, magma, inferno, plasma.
    static ref COLOR_MAPS: [scarlet::colormap::ListedColorMap; 4] = [
        scarlet::colormap::ListedColorMap::viridis(),
        scarlet::colormap::ListedColorMap::magma(),
        scarlet::colormap::ListedColorMap::inferno(),
        scarlet::colormap::ListedColorMap::plasma(),
    ];
}

// Out of range indices fall back to viridis.
pub fn get_color_map_from_index(i: i32) -> &'static scarlet::colormap::ListedColorMap {
    if i < 0 || i as usize >= COLOR_MAPS.len() {
        log::warn!("No color map with index {}, using viridis", i);
        return &COLOR_MAPS[FALLBACK_COLOR_MAP];
    }
    &COLOR_MAPS[i as usize]
}

// Maps a density byte onto the color map.
pub fn density_color(cm: &scarlet::colormap::ListedColorMap, density: u8) -> [u8; 3] {
    let parameter = density as f64 / 255.0;
    let color_point: scarlet::color::RGBColor =
        scarlet::colormap::ColorMap::transform_single(cm, parameter);
    [color_point.int_r(), color_point.int_g(), color_point.int_b()]
}
