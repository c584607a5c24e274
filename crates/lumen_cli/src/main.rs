use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use lumen_renderer::{RenderConfig, Renderer};

/// How often render progress is logged.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

fn load_config() -> Result<RenderConfig> {
    match std::env::args().nth(1) {
        Some(path) => RenderConfig::from_file(&path).with_context(|| format!("Failed to load config {path}")),
        None => {
            log::info!("No config given, using defaults");
            Ok(RenderConfig::default())
        }
    }
}

/// Render one frame, logging progress from a watcher thread.
fn render(renderer: &Renderer, buffer: &mut [u32], threads: usize) -> Result<()> {
    let done = AtomicBool::new(false);
    let stride = renderer.width() as usize * 4;

    std::thread::scope(|scope| {
        scope.spawn(|| {
            let mut reported = 0;
            while !done.load(Ordering::Relaxed) {
                std::thread::sleep(PROGRESS_INTERVAL);
                let sample = renderer.sample();
                if sample != reported {
                    log::info!("Sample {}/{}", sample, renderer.samples_pixel());
                    reported = sample;
                }
            }
        });

        let result = renderer.render_frame(buffer, threads, stride);
        done.store(true, Ordering::Relaxed);
        result
    })?;
    Ok(())
}

fn save_png(path: &Path, buffer: &[u32], width: u32, height: u32) -> Result<()> {
    // 0xAABBGGRR little-endian is R, G, B, A in memory
    let bytes: Vec<u8> = buffer.iter().flat_map(|pixel| pixel.to_le_bytes()).collect();
    let image = image::RgbaImage::from_raw(width, height, bytes).context("Pixel buffer doesn't match image size")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Lumen");

    let config = load_config()?;
    let threads = config.thread_count();
    log::info!(
        "{:?} scene, {:?} shader, {:?} accelerator, {:?} sampler",
        config.scene,
        config.shader,
        config.accelerator,
        config.sampler
    );

    let start = Instant::now();
    let renderer = config.build_renderer().context("Failed to set up render")?;
    log::info!("Setup took {:.2?}", start.elapsed());

    let mut buffer = vec![0u32; config.width as usize * config.height as usize];
    let start = Instant::now();
    render(&renderer, &mut buffer, threads)?;
    log::info!(
        "Rendered {} samples in {:.2?}",
        renderer.sample(),
        start.elapsed()
    );

    save_png(&config.output, &buffer, config.width, config.height)?;
    log::info!("Saved {}", config.output.display());

    Ok(())
}
