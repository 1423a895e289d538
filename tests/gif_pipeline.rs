use std::{fs::File, io::BufReader, path::PathBuf};

use image::{AnimationDecoder as _, codecs::gif::GifDecoder};
use pendula::{StudioConfig, default_gif_config, encode_animation, integrate};

fn small_config() -> StudioConfig {
    let mut cfg = StudioConfig::default();
    cfg.simulation.t_max = 0.5;
    cfg.scene.width = 80;
    cfg.scene.height = 80;
    cfg.scene.caption = false;
    cfg.animation.stride = 10;
    cfg
}

#[test]
fn animation_encodes_one_frame_per_stride_sample() {
    let dir = PathBuf::from("target").join("gif_pipeline");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("pendulum.gif");

    let cfg = small_config();
    let trajectory = integrate(&cfg.simulation).unwrap();
    assert_eq!(trajectory.len(), 50);

    let gif_cfg = default_gif_config(&out, 80, 80, cfg.animation.fps);
    let frames = encode_animation(&trajectory, &cfg, gif_cfg, None).unwrap();
    assert_eq!(frames, 5);

    let decoder = GifDecoder::new(BufReader::new(File::open(&out).unwrap())).unwrap();
    let decoded = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(decoded.len(), 5);
    assert_eq!(decoded[0].buffer().width(), 80);
    assert_eq!(decoded[0].buffer().height(), 80);
}

#[test]
fn frame_dump_writes_one_png_per_frame() {
    let dir = PathBuf::from("target").join("gif_pipeline_frames");
    let frames_dir = dir.join("frames");
    let _ = std::fs::remove_dir_all(&frames_dir);
    std::fs::create_dir_all(&dir).unwrap();

    let cfg = small_config();
    let trajectory = integrate(&cfg.simulation).unwrap();

    let gif_cfg = default_gif_config(dir.join("pendulum.gif"), 80, 80, cfg.animation.fps);
    let frames = encode_animation(&trajectory, &cfg, gif_cfg, Some(&frames_dir)).unwrap();
    assert_eq!(frames, 5);

    for i in 0..5 {
        let path = frames_dir.join(format!("frame_{i:04}.png"));
        assert!(path.exists(), "missing {}", path.display());
        assert_eq!(image::image_dimensions(&path).unwrap(), (80, 80));
    }
}
