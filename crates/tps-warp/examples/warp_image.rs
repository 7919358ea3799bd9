//! Warp an image file with a thin plate spline.
//!
//! ```text
//! cargo run -p tps-warp --example warp_image --features image -- crates/tps-warp/testdata/rotate90.json
//! ```
//!
//! The config names the input/output images, the landmark pairs and the
//! `WarpParams`. Paths are relative to the working directory; the sample
//! config reads the checkerboard shipped in `crates/tps-warp/testdata/` and
//! writes into `tmpdata/`, which is created if missing. A small JSON report
//! with timings is written next to the output.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use image::ImageReader;
use log::info;
#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
use serde::{Deserialize, Serialize};
#[cfg(not(feature = "tracing"))]
use tps_core::init_from_env;
use tps_core::Image;
use tps_warp::{tps_warp, WarpParams};

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    image_path: String,
    output_path: String,
    #[serde(default)]
    report_path: Option<String>,
    /// Warp all three colour channels instead of a grayscale copy.
    #[serde(default)]
    rgb: bool,
    src: Vec<[f64; 2]>,
    dst: Vec<[f64; 2]>,
    #[serde(default)]
    warp: WarpParams,
}

#[derive(Debug, Serialize)]
struct TimingsMs {
    load_image: u64,
    warp: u64,
    save_image: u64,
}

#[derive(Debug, Serialize)]
struct ExampleReport {
    image_path: String,
    output_path: String,
    width: usize,
    height: usize,
    channels: usize,
    landmarks: usize,
    warp: WarpParams,
    timings_ms: TimingsMs,
}

fn ensure_parent(path: &str) -> std::io::Result<()> {
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    tps_core::init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    init_from_env(LevelFilter::Info)?;

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/tps-warp/testdata/rotate90.json"));
    let cfg: ExampleConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)?;

    let src = tps_warp::landmarks_from(&cfg.src);
    let dst = tps_warp::landmarks_from(&cfg.dst);

    let t0 = Instant::now();
    let decoded = ImageReader::open(&cfg.image_path)?.decode()?;
    let input: Image<u8> = if cfg.rgb {
        Image::try_from(&decoded.to_rgb8())?
    } else {
        Image::try_from(&decoded.to_luma8())?
    };
    let load_image_ms = t0.elapsed().as_millis() as u64;
    info!(
        "loaded {} ({}x{}x{})",
        cfg.image_path,
        input.width(),
        input.height(),
        input.channels()
    );

    let t0 = Instant::now();
    let warped = tps_warp(&input.view(), &src, &dst, &cfg.warp)?;
    let warp_ms = t0.elapsed().as_millis() as u64;
    info!(
        "warped to {}x{} in {} ms (grid_scale {})",
        warped.width(),
        warped.height(),
        warp_ms,
        cfg.warp.grid_scale
    );

    ensure_parent(&cfg.output_path)?;
    let t0 = Instant::now();
    match warped.channels() {
        3 => warped
            .to_rgb_image()
            .ok_or("rgb buffer size mismatch")?
            .save(&cfg.output_path)?,
        _ => warped
            .to_gray_image()
            .ok_or("gray buffer size mismatch")?
            .save(&cfg.output_path)?,
    }
    let save_image_ms = t0.elapsed().as_millis() as u64;
    info!("wrote {}", cfg.output_path);

    if let Some(report_path) = cfg.report_path.as_deref() {
        let report = ExampleReport {
            image_path: cfg.image_path.clone(),
            output_path: cfg.output_path.clone(),
            width: warped.width(),
            height: warped.height(),
            channels: warped.channels(),
            landmarks: src.len(),
            warp: cfg.warp.clone(),
            timings_ms: TimingsMs {
                load_image: load_image_ms,
                warp: warp_ms,
                save_image: save_image_ms,
            },
        };
        ensure_parent(report_path)?;
        fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
        info!("wrote report JSON to {report_path}");
    }

    Ok(())
}
