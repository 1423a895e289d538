//! Animated-GIF assembly on top of `image`'s GIF codec.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{
    Delay, Frame, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
};

use crate::error::{PendulaError, PendulaResult};

#[derive(Clone, Debug)]
pub struct GifConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
    pub loop_forever: bool,
}

impl GifConfig {
    pub fn validate(&self) -> PendulaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PendulaError::invalid_config(
                "gif width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(PendulaError::invalid_config("gif fps must be non-zero"));
        }
        Ok(())
    }

    pub fn with_out_path(mut self, out_path: impl Into<PathBuf>) -> Self {
        self.out_path = out_path.into();
        self
    }
}

pub fn default_gif_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> GifConfig {
    GifConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
        loop_forever: true,
    }
}

pub fn ensure_parent_dir(path: &Path) -> PendulaResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams frames into an animated GIF.
///
/// Frames are encoded as they arrive; nothing is buffered beyond the codec's
/// own state. The underlying writer is flushed when the encoder is dropped in
/// [`GifWriter::finish`].
pub struct GifWriter {
    cfg: GifConfig,
    encoder: Option<GifEncoder<BufWriter<File>>>,
    frames: u64,
}

impl GifWriter {
    pub fn create(cfg: GifConfig) -> PendulaResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(PendulaError::encode(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        let file = File::create(&cfg.out_path).map_err(|e| {
            PendulaError::encode(format!(
                "failed to create '{}': {e}",
                cfg.out_path.display()
            ))
        })?;

        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), 10);
        if cfg.loop_forever {
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| PendulaError::encode(format!("failed to set gif repeat: {e}")))?;
        }

        Ok(Self {
            cfg,
            encoder: Some(encoder),
            frames: 0,
        })
    }

    pub fn push_frame(&mut self, image: RgbaImage) -> PendulaResult<()> {
        if image.width() != self.cfg.width || image.height() != self.cfg.height {
            return Err(PendulaError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(encoder) = self.encoder.as_mut() else {
            return Err(PendulaError::encode("gif writer is already finalized"));
        };

        let delay = Delay::from_numer_denom_ms(1000, self.cfg.fps);
        encoder
            .encode_frame(Frame::from_parts(image, 0, 0, delay))
            .map_err(|e| PendulaError::encode(format!("failed to encode gif frame: {e}")))?;

        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Finalize the file and return the number of frames written.
    pub fn finish(mut self) -> PendulaResult<u64> {
        if self.frames == 0 {
            return Err(PendulaError::encode("gif must contain at least one frame"));
        }
        drop(self.encoder.take());
        Ok(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(
            GifConfig {
                width: 0,
                height: 10,
                fps: 20,
                out_path: PathBuf::from("target/out.gif"),
                overwrite: true,
                loop_forever: true,
            }
            .validate()
            .is_err()
        );

        assert!(
            GifConfig {
                width: 10,
                height: 10,
                fps: 0,
                out_path: PathBuf::from("target/out.gif"),
                overwrite: true,
                loop_forever: true,
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn writer_rejects_mismatched_frame() {
        let dir = PathBuf::from("target").join("gif_writer_unit");
        std::fs::create_dir_all(&dir).unwrap();

        let cfg = default_gif_config(dir.join("mismatch.gif"), 16, 16, 20);
        let mut writer = GifWriter::create(cfg).unwrap();
        let wrong = RgbaImage::new(8, 8);
        assert!(writer.push_frame(wrong).is_err());
    }

    #[test]
    fn empty_gif_is_an_error() {
        let dir = PathBuf::from("target").join("gif_writer_unit");
        std::fs::create_dir_all(&dir).unwrap();

        let cfg = default_gif_config(dir.join("empty.gif"), 16, 16, 20);
        let writer = GifWriter::create(cfg).unwrap();
        assert!(writer.finish().is_err());
    }

    #[test]
    fn refuses_existing_output_without_overwrite() {
        let dir = PathBuf::from("target").join("gif_writer_unit");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("existing.gif");
        std::fs::write(&path, b"placeholder").unwrap();

        let cfg = GifConfig {
            overwrite: false,
            ..default_gif_config(&path, 16, 16, 20)
        };
        assert!(GifWriter::create(cfg).is_err());
    }
}
