use std::{fs::File, io::Read as _, path::PathBuf};

use pendula::{Deck, GifWriter, PictureRef, Slide, default_deck, default_gif_config};

fn make_stand_in_media(dir: &PathBuf) -> (PathBuf, PathBuf) {
    let gif_path = dir.join("anim.gif");
    let gif_cfg = default_gif_config(&gif_path, 4, 4, 10);
    let mut writer = GifWriter::create(gif_cfg).unwrap();
    writer
        .push_frame(image::RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([220, 40, 40, 255]),
        ))
        .unwrap();
    writer.finish().unwrap();

    let chart_path = dir.join("chart.png");
    image::RgbaImage::from_pixel(6, 4, image::Rgba([30, 90, 200, 255]))
        .save(&chart_path)
        .unwrap();

    (gif_path, chart_path)
}

#[test]
fn deck_package_contains_expected_parts() {
    let dir = PathBuf::from("target").join("deck_output");
    std::fs::create_dir_all(&dir).unwrap();
    let (gif_path, chart_path) = make_stand_in_media(&dir);

    let deck = default_deck(&gif_path, &chart_path);
    let pptx = dir.join("pendulum.pptx");
    deck.write_pptx(&pptx).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&pptx).unwrap()).unwrap();
    for name in [
        "[Content_Types].xml",
        "_rels/.rels",
        "ppt/presentation.xml",
        "ppt/_rels/presentation.xml.rels",
        "ppt/slideMasters/slideMaster1.xml",
        "ppt/slideLayouts/slideLayout1.xml",
        "ppt/theme/theme1.xml",
        "ppt/slides/slide1.xml",
        "ppt/slides/slide3.xml",
        "ppt/slides/slide5.xml",
        "ppt/slides/_rels/slide3.xml.rels",
        "ppt/media/image1.gif",
        "ppt/media/image2.png",
    ] {
        assert!(zip.by_name(name).is_ok(), "missing part {name}");
    }

    let mut title_slide = String::new();
    zip.by_name("ppt/slides/slide1.xml")
        .unwrap()
        .read_to_string(&mut title_slide)
        .unwrap();
    assert!(title_slide.contains("Oscillations of a Simple Pendulum"));

    let mut animation_rels = String::new();
    zip.by_name("ppt/slides/_rels/slide3.xml.rels")
        .unwrap()
        .read_to_string(&mut animation_rels)
        .unwrap();
    assert!(animation_rels.contains("../media/image1.gif"));

    let mut content_types = String::new();
    zip.by_name("[Content_Types].xml")
        .unwrap()
        .read_to_string(&mut content_types)
        .unwrap();
    assert!(content_types.contains(r#"Extension="gif""#));
    assert!(content_types.contains("/ppt/slides/slide5.xml"));
}

#[test]
fn missing_picture_file_fails_at_write_time() {
    let dir = PathBuf::from("target").join("deck_output_missing");
    std::fs::create_dir_all(&dir).unwrap();

    let deck = Deck {
        slides: vec![Slide::picture(
            "Broken",
            PictureRef::new(dir.join("nope.png"), 1.0, 1.0, 4.0),
        )],
    };
    assert!(deck.write_pptx(&dir.join("broken.pptx")).is_err());
}
