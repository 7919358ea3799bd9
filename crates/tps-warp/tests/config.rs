use std::path::{Path, PathBuf};

use serde::Deserialize;
use tps_core::Image;
use tps_warp::{landmarks_from, tps_warp, Interpolation, WarpParams};

#[derive(Deserialize)]
struct DemoConfig {
    image_path: String,
    src: Vec<[f64; 2]>,
    dst: Vec<[f64; 2]>,
    #[serde(default)]
    warp: WarpParams,
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn load_config(name: &str) -> DemoConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name);
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn rotate90_config_rotates_the_shipped_image() {
    let _ = env_logger::builder().is_test(true).try_init();

    let cfg = load_config("rotate90.json");
    assert_eq!(cfg.warp.grid_scale, 4);
    assert_eq!(cfg.warp.interpolation, Interpolation::Linear);

    let gray = image::open(workspace_root().join(&cfg.image_path))
        .unwrap()
        .to_luma8();
    assert_eq!(gray.dimensions(), (501, 501));

    let input = Image::try_from(&gray).unwrap();
    let warped = tps_warp(
        &input.view(),
        &landmarks_from(&cfg.src),
        &landmarks_from(&cfg.dst),
        &cfg.warp,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("rotated.png");
    warped.to_gray_image().unwrap().save(&output_path).unwrap();
    let out = image::open(&output_path).unwrap().to_luma8();
    assert_eq!(out.dimensions(), (501, 501));

    // out(X, Y) = in(Y, 500 - X)
    for y in 0..501u32 {
        for x in 0..501u32 {
            assert_eq!(
                out.get_pixel(x, y)[0],
                gray.get_pixel(y, 500 - x)[0],
                "({x},{y})"
            );
        }
    }
}
