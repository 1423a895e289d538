use std::path::PathBuf;

use pendula::{ChartStyle, SimulationConfig, integrate, save_angle_chart};

#[test]
fn chart_png_is_written_at_configured_size() {
    let dir = PathBuf::from("target").join("chart_output");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("theta_vs_time.png");
    let _ = std::fs::remove_file(&out);

    let cfg = SimulationConfig {
        t_max: 2.0,
        ..Default::default()
    };
    let trajectory = integrate(&cfg).unwrap();

    save_angle_chart(&trajectory, &out, &ChartStyle::default()).unwrap();

    assert!(out.exists());
    assert_eq!(image::image_dimensions(&out).unwrap(), (800, 600));
}
