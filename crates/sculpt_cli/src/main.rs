use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use rand::Rng;
use sculpt_core::{Action, CameraFrame, FrameState, Scene};
use sculpt_math::{Vec2, Vec3};
use sculpt_renderer::{
    pick, Accumulator, CancelToken, GroundPlane, PinholeCamera, ProgressiveSampler, RenderSettings, SamplerEvent,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sculpt")]
#[command(version)]
#[command(about = "Progressively path trace the Sculpt demo scene", long_about = None)]
struct Cli {
    /// JSON render settings; missing fields keep their defaults
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Output image (format from the extension)
    #[arg(short, long, default_value = "sculpt.png")]
    output: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel in each frame
    #[arg(long)]
    samples: Option<u32>,

    /// Frames to accumulate
    #[arg(short, long)]
    frames: Option<u32>,

    /// Horizontal field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Add a ground plane at this height
    #[arg(long, allow_negative_numbers = true)]
    ground: Option<f32>,

    /// Camera position
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
          default_values_t = [0.0f32, 0.0, -3.0])]
    origin: Vec<f32>,

    /// Point the camera looks at
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
          default_values_t = [0.0f32, -0.4, 0.0])]
    look_at: Vec<f32>,

    /// Disable scene nodes by name
    #[arg(long, value_name = "NAME")]
    hide: Vec<String>,

    /// Report the surface under a normalized screen position
    #[arg(long, num_args = 2, value_names = ["U", "V"])]
    pick: Option<Vec<f32>>,

    /// Also save the image every N frames
    #[arg(long, default_value_t = 0)]
    checkpoint: u32,
}

impl Cli {
    /// Settings file (or defaults) with command-line overrides applied.
    fn render_settings(&self) -> Result<RenderSettings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => RenderSettings::default(),
        };
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(frames) = self.frames {
            settings.max_frames = frames;
        }
        if let Some(fov) = self.fov {
            settings.fov = fov;
        }
        if let Some(height) = self.ground {
            let plane = settings.ground.unwrap_or_default();
            settings.ground = Some(GroundPlane { height, ..plane });
        }
        Ok(settings)
    }
}

fn load_settings(path: &Path) -> Result<RenderSettings> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading settings {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
}

fn vec3(values: &[f32], what: &str) -> Result<Vec3> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("{what} needs three components, got {}", values.len()),
    }
}

fn hide_nodes(scene: &mut Scene, names: &[String]) -> Result<()> {
    for name in names {
        let ids: Vec<_> = scene.iter().filter(|(_, node)| &node.name == name).map(|(id, _)| id).collect();
        if ids.is_empty() {
            log::warn!("No node named '{}'", name);
        }
        for id in ids {
            scene.set_action(id, Action::None)?;
            log::info!("Disabled node {} ({})", name, id);
        }
    }
    Ok(())
}

fn report_pick(scene: &Scene, camera: &PinholeCamera, uv: &[f32], settings: &RenderSettings) -> Result<()> {
    let [u, v] = uv else {
        bail!("--pick needs two components");
    };
    match pick(scene, camera, Vec2::new(*u, *v), settings) {
        Some(hit) => {
            let name = if hit.ground {
                "ground"
            } else {
                hit.node.and_then(|id| scene.get(id)).map_or("?", |node| node.name.as_str())
            };
            log::info!(
                "Pick ({u}, {v}): '{}' at {:.3?} normal {:.3?} distance {:.3}",
                name,
                hit.point,
                hit.normal,
                hit.t
            );
        }
        None => log::info!("Pick ({u}, {v}): background"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let settings = cli.render_settings()?;
    ensure!(settings.max_frames > 0, "a frame limit is required (--frames)");

    log::info!("Starting Sculpt");

    let mut scene = Scene::demo().context("building demo scene")?;
    hide_nodes(&mut scene, &cli.hide)?;
    log::info!("Scene: {} nodes, {} active", scene.len(), scene.active_count());

    let frame = CameraFrame::build(vec3(&cli.origin, "--origin")?, vec3(&cli.look_at, "--look-at")?)
        .context("invalid camera")?
        .with_world_bounds(&scene.bounds());
    let camera = PinholeCamera::from_frame(frame, settings.width, settings.height).with_fov(settings.fov);

    if let Some(uv) = &cli.pick {
        report_pick(&scene, &camera, uv, &settings)?;
    }

    log::info!(
        "Rendering {}x{} @ {} spp, up to {} frames",
        camera.image_width,
        camera.image_height,
        settings.samples_per_pixel,
        settings.max_frames
    );

    let mut sampler = ProgressiveSampler::new(settings);
    let mut accum = Accumulator::new(camera.image_width, camera.image_height);
    let cancel = CancelToken::new();
    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut state = FrameState::default();

    loop {
        let seed = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        let events = sampler.step(&scene, &camera, state, seed, &mut accum, &cancel)?;

        if cli.checkpoint > 0 && accum.frame_count() > 0 && accum.frame_count() % cli.checkpoint == 0 {
            save(&accum, &cli.output)?;
        }
        if events.iter().any(|event| matches!(event, SamplerEvent::Converged { .. })) {
            break;
        }
        state = state.advance(start.elapsed().as_secs_f32() - state.time);
    }

    log::info!("Accumulated {} frames in {:.2?}", accum.frame_count(), start.elapsed());
    save(&accum, &cli.output)
}

fn save(accum: &Accumulator, path: &Path) -> Result<()> {
    accum
        .buffer()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {} ({} frames)", path.display(), accum.frame_count());
    Ok(())
}
