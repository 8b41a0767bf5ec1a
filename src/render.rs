//! Parallel scanline dispatch.
//!
//! The image is cut into equal row bands, one per worker. Every worker owns
//! its band of the framebuffer exclusively and reads the scene and camera
//! through shared references, so nothing is locked while tracing. Ray counts
//! come back per band and are summed once all workers have joined.

use std::{
    error::Error,
    fmt::{self, Display},
    ops::Range,
    time::{Duration, Instant},
};

use log::{debug, trace};
use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuildError, ThreadPoolBuilder,
};

use crate::{
    camera::Camera,
    framebuffer::{Band, Framebuffer},
    scene::Scene,
    shade::{self, Antialiasing},
};

#[derive(Debug)]
pub enum RenderError {
    ZeroWorkers,
    EmptyImage {
        width: u32,
        height: u32,
    },
    UnevenBands {
        height: u32,
        workers: usize,
    },
    FramebufferTooSmall {
        width: u32,
        height: u32,
        pitch: usize,
        len: usize,
    },
    SizeMismatch {
        camera: (u32, u32),
        framebuffer: (u32, u32),
    },
    WorkerPool(ThreadPoolBuildError),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ZeroWorkers => write!(f, "Worker count must be at least 1"),
            RenderError::EmptyImage { width, height } => {
                write!(f, "Can't render a {}x{} image, both sides must be positive", width, height)
            }
            RenderError::UnevenBands { height, workers } => write!(
                f,
                "Image height {} isn't divisible by the worker count {}",
                height, workers
            ),
            RenderError::FramebufferTooSmall {
                width,
                height,
                pitch,
                len,
            } => write!(
                f,
                "Framebuffer of {} bytes with pitch {} can't hold a {}x{} image",
                len, pitch, width, height
            ),
            RenderError::SizeMismatch {
                camera,
                framebuffer,
            } => write!(
                f,
                "Camera is set up for {}x{} but the framebuffer is {}x{}",
                camera.0, camera.1, framebuffer.0, framebuffer.1
            ),
            RenderError::WorkerPool(error) => write!(f, "Couldn't start render workers: {}", error),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::WorkerPool(error) => Some(error),
            _ => None,
        }
    }
}

/// Rays traced by one worker over its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandStats {
    pub index: usize,
    pub rows: Range<u32>,
    pub rays: u64,
}

#[derive(Debug, Clone)]
pub struct RenderStats {
    /// Primary plus shadow rays over the whole image.
    pub rays: u64,
    pub bands: Vec<BandStats>,
    pub elapsed: Duration,
}

impl RenderStats {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3
    }

    /// Millions of rays per second.
    pub fn mrays_per_sec(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.rays as f64 / seconds * 1e-6
        } else {
            0.0
        }
    }
}

/// Row ranges for `workers` equal bands over `height` rows.
pub fn band_layout(height: u32, workers: usize) -> Result<Vec<Range<u32>>, RenderError> {
    if workers == 0 {
        return Err(RenderError::ZeroWorkers);
    }

    if height as usize % workers != 0 {
        return Err(RenderError::UnevenBands { height, workers });
    }

    let rows_per_band = height / workers as u32;
    Ok((0..workers as u32)
        .map(|band| band * rows_per_band..(band + 1) * rows_per_band)
        .collect())
}

pub struct Renderer {
    scene: Scene,
    camera: Camera,
    antialiasing: Antialiasing,
    workers: usize,
}

impl Renderer {
    pub fn new(scene: Scene, camera: Camera, antialiasing: Antialiasing, workers: usize) -> Self {
        Renderer {
            scene,
            camera,
            antialiasing,
            workers,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Renders every pixel into `framebuffer` and returns the ray totals.
    ///
    /// The band layout and the worker pool are both set up before any pixel
    /// is traced, so on error the framebuffer is left untouched.
    pub fn render(&self, framebuffer: &mut Framebuffer) -> Result<RenderStats, RenderError> {
        let camera_size = (self.camera.width(), self.camera.height());
        let framebuffer_size = (framebuffer.width(), framebuffer.height());
        if camera_size != framebuffer_size {
            return Err(RenderError::SizeMismatch {
                camera: camera_size,
                framebuffer: framebuffer_size,
            });
        }

        let layout = band_layout(framebuffer.height(), self.workers)?;
        debug!(
            "Splitting {} rows into {} bands of {} rows",
            framebuffer.height(),
            layout.len(),
            layout[0].len()
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("band-worker-{}", index))
            .build()
            .map_err(RenderError::WorkerPool)?;

        let start = Instant::now();
        let bands = framebuffer.bands_mut(self.workers);
        let band_stats: Vec<BandStats> = pool.install(|| {
            bands
                .into_par_iter()
                .map(|band| self.render_band(band))
                .collect()
        });
        let elapsed = start.elapsed();

        let rays = band_stats.iter().map(|band| band.rays).sum();
        Ok(RenderStats {
            rays,
            bands: band_stats,
            elapsed,
        })
    }

    fn render_band(&self, mut band: Band) -> BandStats {
        let mut rays = 0;

        for y in band.rows.clone() {
            for x in 0..band.width() {
                let (pixel, traced) = shade::pixel(&self.camera, &self.scene, self.antialiasing, x, y);
                band.set_pixel(x, y, pixel);
                rays += traced;
            }
        }

        trace!("Band {} ({:?}) traced {} rays", band.index, band.rows, rays);
        BandStats {
            index: band.index,
            rows: band.rows,
            rays,
        }
    }
}
