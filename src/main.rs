mod logger;

use std::{error::Error, process::exit};

use log::{debug, error, info};
use raycast::{
    framebuffer::{Framebuffer, BYTES_PER_PIXEL},
    io::{read_args, read_input, save_to_png, Args, SceneParams},
};

use logger::init_logger;

/// Row alignment of the stand-in display surface.
const PITCH_ALIGNMENT: usize = 64;

fn main() {
    let args = read_args();
    init_logger(args.log_level);

    if let Err(error) = run(&args) {
        error!("{}", error);
        exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut scene_params = match &args.scene {
        Some(filename) => read_input(filename)?,
        None => SceneParams::default(),
    };
    args.apply(&mut scene_params);
    scene_params.validate()?;

    let (width, height) = (scene_params.width(), scene_params.height());
    let renderer = scene_params.renderer();
    info!(
        "Rendering {}x{} with {} spheres, {} lights, {} workers, {} samples per pixel",
        width,
        height,
        renderer.scene().spheres.len(),
        renderer.scene().lights.len(),
        renderer.workers(),
        scene_params.settings.antialiasing.sample_count()
    );

    let pitch = (width as usize * BYTES_PER_PIXEL).next_multiple_of(PITCH_ALIGNMENT);
    let mut pixels = vec![0u8; pitch * height as usize];
    let mut framebuffer = Framebuffer::new(&mut pixels, width, height, pitch)?;

    let stats = renderer.render(&mut framebuffer)?;
    for band in &stats.bands {
        debug!("Band {} rows {:?}: {} rays", band.index, band.rows, band.rays);
    }
    info!(
        "{}r in {:.3}ms = {:.3}mrps",
        stats.rays,
        stats.elapsed_ms(),
        stats.mrays_per_sec()
    );

    save_to_png(&framebuffer, &args.output)?;
    info!("Saved {}x{} image to {}", width, height, args.output);

    Ok(())
}
