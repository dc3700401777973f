//! Simple progressive render example.
//!
//! Builds a small CSG scene, accumulates a few frames and saves a PNG.

use rand::Rng;
use sculpt_core::{CsgNode, FrameState, Material, Primitive, Scene};
use sculpt_renderer::{
    Accumulator, CancelToken, Color, GroundPlane, PinholeCamera, ProgressiveSampler, RenderSettings, SamplerEvent, Vec3,
};

fn main() {
    println!("Sculpt Path Tracer - Simple Example");
    println!("===================================");

    let start = std::time::Instant::now();
    let scene = build_scene();
    println!("Scene built in {:?} ({} nodes)", start.elapsed(), scene.len());

    let settings = RenderSettings {
        ground: Some(GroundPlane {
            height: -1.4,
            ..Default::default()
        }),
        ..RenderSettings::default()
            .with_resolution(400, 225)
            .with_quality(2, 4)
            .with_max_frames(16)
    };

    let camera = PinholeCamera::new(Vec3::new(0.0, 0.2, -3.0), Vec3::new(0.0, -0.5, 0.0), settings.width, settings.height)
        .expect("Camera origin and look-at must differ")
        .with_fov(settings.fov);
    let camera = camera.with_frame(camera.frame().with_world_bounds(&scene.bounds()));

    println!(
        "Rendering {}x{} @ {} spp x {} frames...",
        camera.image_width, camera.image_height, settings.samples_per_pixel, settings.max_frames
    );

    let mut sampler = ProgressiveSampler::new(settings);
    let mut accum = Accumulator::new(camera.image_width, camera.image_height);
    let cancel = CancelToken::new();
    let mut rng = rand::thread_rng();
    let mut state = FrameState::default();

    let start = std::time::Instant::now();
    loop {
        let seed = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        let events = sampler
            .step(&scene, &camera, state, seed, &mut accum, &cancel)
            .expect("Invalid render settings");
        if events.iter().any(|e| matches!(e, SamplerEvent::Converged { .. })) {
            break;
        }
        state = state.advance(start.elapsed().as_secs_f32() - state.time);
    }
    println!("Accumulated {} frames in {:?}", accum.frame_count(), start.elapsed());

    let filename = "output.png";
    accum.buffer().save(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Scene {
    let mut scene = Scene::demo().expect("Demo scene is valid");

    // A rotated box and two small spheres beside the base
    let tilted = Primitive::rounded_box(
        Vec3::new(0.75, -0.2, 0.2),
        Vec3::new(0.3, 0.6, 0.0),
        Vec3::new(0.15, 0.2, 0.15),
        0.04,
    )
    .expect("Box parameters are valid");
    scene
        .add(CsgNode::new("Tilted Box", tilted).with_material(Material::diffuse(Color::new(0.2, 0.4, 0.8))))
        .expect("Node is valid");

    for (i, x) in [-0.7f32, -0.45].into_iter().enumerate() {
        let sphere = Primitive::sphere(Vec3::new(x, -0.28, -0.2), 0.12).expect("Sphere parameters are valid");
        let material = Material {
            albedo: Color::splat(0.9),
            emission: if i == 0 { Color::new(4.0, 3.0, 1.5) } else { Color::ZERO },
        };
        scene
            .add(CsgNode::new(format!("Pebble {i}"), sphere).with_material(material))
            .expect("Node is valid");
    }

    scene
}
