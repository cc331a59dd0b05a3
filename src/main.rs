use log::{error, info};
use rand::SeedableRng;

gflags::define! {
    --config: &str = "scene_config.toml"
}

gflags::define! {
    --log_filter: &str = "warn,nebula=info"
}

gflags::define! {
    --out_dir: &str = "."
}

gflags::define! {
    --seeded = false
}

gflags::define! {
    --seed: u64 = 0
}

gflags::define! {
    --pixel_ratio: f32 = 1.0
}

gflags::define! {
    -h, --help = false
}

fn read_config_from_file(path: &str) -> anyhow::Result<nebula::scene_params::SceneParams> {
    let params = std::fs::read_to_string(path)?.parse()?;
    Ok(params)
}

fn get_scene_config() -> nebula::scene_params::SceneParams {
    match read_config_from_file(CONFIG.flag) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to parse config file({}): {:?}", CONFIG.flag, e);
            nebula::scene_params::get_scene_config_from_default_file()
        }
    }
}

fn run() -> anyhow::Result<()> {
    let params = get_scene_config();
    info!("Scene config: {:?}", params);

    let backend = nebula::preview::ImageBackend::new(params.preview_size, params.color_map);
    let mut scene = nebula::scene::Scene::new(backend, PIXEL_RATIO.flag);
    if SEEDED.flag {
        let mut rng = rand::rngs::StdRng::seed_from_u64(SEED.flag);
        scene.apply(&params, &mut rng)?;
    } else {
        scene.apply(&params, &mut rand::thread_rng())?;
    }

    if let Some(particles) = scene.particles() {
        info!("Galaxy: {} particles", particles.len());
    }
    if let Some(volume) = scene.volume() {
        info!("Cloud: {:?} cells", volume.dimensions());
    }

    let out_dir = std::path::Path::new(OUT_DIR.flag);
    std::fs::create_dir_all(out_dir)?;
    let written = scene.backend().save_all(out_dir)?;
    info!("Wrote {} previews", written.len());
    Ok(())
}

fn main() {
    gflags::parse();
    if HELP.flag {
        gflags::print_help_and_exit(0);
    }
    if let Err(e) = scrub_log::init_with_filter_string(LOG_FILTER.flag) {
        eprintln!("Failed to initialize logging: {:?}", e);
    }
    if let Err(e) = run() {
        error!("{:?}", e);
        std::process::exit(1);
    }
}
