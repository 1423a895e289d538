//! Slide-deck assembly: a small typed slide model serialized as a PPTX
//! package (a ZIP of OOXML parts).
//!
//! Only the parts PowerPoint requires are emitted: content types, package
//! rels, the presentation part, one slide master + layout + theme, and one
//! slide part per [`Slide`] with its rels and embedded media.

use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    encode_gif::ensure_parent_dir,
    error::{PendulaError, PendulaResult},
};

pub const EMU_PER_INCH: i64 = 914_400;

// Classic 4:3 slide, 10 x 7.5 in.
const SLIDE_CX: i64 = 9_144_000;
const SLIDE_CY: i64 = 6_858_000;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Deck {
    pub slides: Vec<Slide>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    pub title: String,
    pub body: SlideBody,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum SlideBody {
    /// Lead-in slide: a centered title with a subtitle underneath.
    Lead { subtitle: String },
    /// Indented bullet list under the title.
    Bullets(Vec<Bullet>),
    /// A picture under the title, sourced from a file on disk.
    Picture(PictureRef),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Bullet {
    pub text: String,
    /// Indent level, 0-based. Capped at 4.
    pub level: u8,
}

impl Bullet {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PictureRef {
    pub path: PathBuf,
    /// Placement on the slide, in inches. Height follows the image aspect.
    pub left_in: f64,
    pub top_in: f64,
    pub width_in: f64,
}

impl PictureRef {
    pub fn new(path: impl Into<PathBuf>, left_in: f64, top_in: f64, width_in: f64) -> Self {
        Self {
            path: path.into(),
            left_in,
            top_in,
            width_in,
        }
    }
}

impl Slide {
    pub fn lead(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: SlideBody::Lead {
                subtitle: subtitle.into(),
            },
        }
    }

    pub fn bullets(title: impl Into<String>, bullets: Vec<Bullet>) -> Self {
        Self {
            title: title.into(),
            body: SlideBody::Bullets(bullets),
        }
    }

    pub fn picture(title: impl Into<String>, picture: PictureRef) -> Self {
        Self {
            title: title.into(),
            body: SlideBody::Picture(picture),
        }
    }
}

impl Deck {
    /// Value-level validation. Picture files are only touched at write time.
    pub fn validate(&self) -> PendulaResult<()> {
        if self.slides.is_empty() {
            return Err(PendulaError::deck("deck must contain at least one slide"));
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.title.trim().is_empty() {
                return Err(PendulaError::deck(format!(
                    "slide {} has an empty title",
                    i + 1
                )));
            }
            match &slide.body {
                SlideBody::Lead { .. } => {}
                SlideBody::Bullets(bullets) => {
                    if bullets.is_empty() {
                        return Err(PendulaError::deck(format!(
                            "slide {} has an empty bullet list",
                            i + 1
                        )));
                    }
                    for b in bullets {
                        if b.text.trim().is_empty() {
                            return Err(PendulaError::deck(format!(
                                "slide {} has an empty bullet",
                                i + 1
                            )));
                        }
                        if b.level > 4 {
                            return Err(PendulaError::deck(format!(
                                "slide {} has a bullet level > 4",
                                i + 1
                            )));
                        }
                    }
                }
                SlideBody::Picture(p) => {
                    if !(p.width_in > 0.0) || !p.width_in.is_finite() {
                        return Err(PendulaError::deck(format!(
                            "slide {} picture width must be > 0",
                            i + 1
                        )));
                    }
                    if !p.left_in.is_finite() || !p.top_in.is_finite() {
                        return Err(PendulaError::deck(format!(
                            "slide {} picture placement must be finite",
                            i + 1
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize the deck as a PPTX package at `path`, overwriting any
    /// existing file.
    #[tracing::instrument(skip(self), fields(slides = self.slides.len()))]
    pub fn write_pptx(&self, path: &Path) -> PendulaResult<()> {
        self.validate()?;
        ensure_parent_dir(path)?;

        let file = File::create(path).map_err(|e| {
            PendulaError::deck(format!("failed to create '{}': {e}", path.display()))
        })?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let media = self.load_media()?;

        add_part(&mut zip, "[Content_Types].xml", &self.content_types_xml(), opts)?;
        add_part(&mut zip, "_rels/.rels", PACKAGE_RELS, opts)?;
        add_part(&mut zip, "ppt/presentation.xml", &self.presentation_xml(), opts)?;
        add_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &self.presentation_rels_xml(),
            opts,
        )?;
        add_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER, opts)?;
        add_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS,
            opts,
        )?;
        add_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT, opts)?;
        add_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS,
            opts,
        )?;
        add_part(&mut zip, "ppt/theme/theme1.xml", THEME, opts)?;

        for (i, slide) in self.slides.iter().enumerate() {
            let media_ref = media.iter().find(|m| m.slide_index == i);
            add_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", i + 1),
                slide_xml(slide, media_ref)?.as_bytes(),
                opts,
            )?;
            add_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                slide_rels_xml(media_ref).as_bytes(),
                opts,
            )?;
        }

        for m in &media {
            add_part(&mut zip, &format!("ppt/media/{}", m.name), &m.bytes, opts)?;
        }

        let mut inner = zip
            .finish()
            .map_err(|e| PendulaError::deck(format!("failed to finalize pptx: {e}")))?;
        inner
            .flush()
            .map_err(|e| PendulaError::deck(format!("failed to flush pptx: {e}")))?;
        Ok(())
    }

    fn load_media(&self) -> PendulaResult<Vec<EmbeddedMedia>> {
        let mut media = Vec::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let SlideBody::Picture(p) = &slide.body else {
                continue;
            };

            let ext = p
                .path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            if !matches!(ext.as_str(), "png" | "gif" | "jpg" | "jpeg") {
                return Err(PendulaError::deck(format!(
                    "unsupported picture format for '{}'",
                    p.path.display()
                )));
            }

            let bytes = std::fs::read(&p.path).map_err(|e| {
                PendulaError::deck(format!("failed to read '{}': {e}", p.path.display()))
            })?;
            let (px_w, px_h) = image::image_dimensions(&p.path).map_err(|e| {
                PendulaError::deck(format!("failed to probe '{}': {e}", p.path.display()))
            })?;

            media.push(EmbeddedMedia {
                slide_index: i,
                name: format!("image{}.{}", media.len() + 1, ext),
                bytes,
                px_w,
                px_h,
                placement: p.clone(),
            });
        }
        Ok(media)
    }

    fn content_types_xml(&self) -> Vec<u8> {
        let mut overrides = String::new();
        for i in 1..=self.slides.len() {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="gif" ContentType="image/gif"/><Default Extension="jpg" ContentType="image/jpeg"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{overrides}</Types>"#
        )
        .into_bytes()
    }

    fn presentation_xml(&self) -> Vec<u8> {
        let mut slide_ids = String::new();
        for i in 0..self.slides.len() {
            slide_ids.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + i,
                i + 2
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {XMLNS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}"/><p:notesSz cx="{SLIDE_CY}" cy="{SLIDE_CX}"/></p:presentation>"#
        )
        .into_bytes()
    }

    fn presentation_rels_xml(&self) -> Vec<u8> {
        let mut rels = String::from(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        );
        for i in 0..self.slides.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                i + 2,
                i + 1
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
        .into_bytes()
    }
}

struct EmbeddedMedia {
    slide_index: usize,
    name: String,
    bytes: Vec<u8>,
    px_w: u32,
    px_h: u32,
    placement: PictureRef,
}

pub(crate) fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

fn add_part<W: std::io::Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    opts: SimpleFileOptions,
) -> PendulaResult<()> {
    zip.start_file(name, opts)
        .map_err(|e| PendulaError::deck(format!("failed to start part '{name}': {e}")))?;
    zip.write_all(content)
        .map_err(|e| PendulaError::deck(format!("failed to write part '{name}': {e}")))?;
    Ok(())
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn text_box(
    id: u32,
    name: &str,
    left: i64,
    top: i64,
    width: i64,
    height: i64,
    paragraphs: &str,
) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{left}" y="{top}"/><a:ext cx="{width}" cy="{height}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn paragraph(text: &str, size_hundredths_pt: u32, bold: bool, centered: bool) -> String {
    let b = if bold { r#" b="1""# } else { "" };
    let algn = if centered { r#" algn="ctr""# } else { "" };
    format!(
        r#"<a:p><a:pPr{algn}/><a:r><a:rPr lang="en-US" sz="{size_hundredths_pt}"{b}/><a:t>{}</a:t></a:r></a:p>"#,
        xml_escape(text)
    )
}

fn bullet_paragraph(bullet: &Bullet) -> String {
    // Indent geometry per level; the master carries no list styles, so each
    // paragraph spells out its own marker.
    let level = bullet.level as i64;
    let mar_l = 342_900 + level * 400_050;
    let (glyph, size) = if bullet.level == 0 {
        ("\u{2022}", 2400)
    } else {
        ("\u{2013}", 2000)
    };
    format!(
        r#"<a:p><a:pPr marL="{mar_l}" indent="-285750" lvl="{}"><a:buChar char="{glyph}"/></a:pPr><a:r><a:rPr lang="en-US" sz="{size}"/><a:t>{}</a:t></a:r></a:p>"#,
        bullet.level,
        xml_escape(&bullet.text)
    )
}

fn picture_shape(id: u32, rel_id: &str, media: &EmbeddedMedia) -> String {
    let p = &media.placement;
    let width = inches_to_emu(p.width_in);
    let height = (width as f64 * media.px_h as f64 / media.px_w.max(1) as f64).round() as i64;
    let left = inches_to_emu(p.left_in);
    let top = inches_to_emu(p.top_in);
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{left}" y="{top}"/><a:ext cx="{width}" cy="{height}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
    )
}

fn slide_xml(slide: &Slide, media: Option<&EmbeddedMedia>) -> PendulaResult<String> {
    let mut shapes = String::new();

    match &slide.body {
        SlideBody::Lead { subtitle } => {
            shapes.push_str(&text_box(
                2,
                "Title",
                inches_to_emu(0.5),
                inches_to_emu(2.4),
                inches_to_emu(9.0),
                inches_to_emu(1.3),
                &paragraph(&slide.title, 4000, true, true),
            ));
            shapes.push_str(&text_box(
                3,
                "Subtitle",
                inches_to_emu(0.5),
                inches_to_emu(3.8),
                inches_to_emu(9.0),
                inches_to_emu(1.0),
                &paragraph(subtitle, 2000, false, true),
            ));
        }
        SlideBody::Bullets(bullets) => {
            shapes.push_str(&title_shape(&slide.title));
            let body: String = bullets.iter().map(bullet_paragraph).collect();
            shapes.push_str(&text_box(
                3,
                "Body",
                inches_to_emu(0.75),
                inches_to_emu(1.8),
                inches_to_emu(8.5),
                inches_to_emu(4.9),
                &body,
            ));
        }
        SlideBody::Picture(_) => {
            shapes.push_str(&title_shape(&slide.title));
            let media = media.ok_or_else(|| {
                PendulaError::deck("picture slide without loaded media (bug)")
            })?;
            shapes.push_str(&picture_shape(3, "rId2", media));
        }
    }

    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {XMLNS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    ))
}

fn title_shape(title: &str) -> String {
    text_box(
        2,
        "Title",
        inches_to_emu(0.5),
        inches_to_emu(0.4),
        inches_to_emu(9.0),
        inches_to_emu(1.1),
        &paragraph(title, 3200, true, false),
    )
}

fn slide_rels_xml(media: Option<&EmbeddedMedia>) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    );
    if let Some(m) = media {
        rels.push_str(&format!(
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>"#,
            m.name
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    )
}

const XMLNS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const PACKAGE_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

const SLIDE_MASTER: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="FFFFFF"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const SLIDE_MASTER_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const SLIDE_LAYOUT: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const SLIDE_LAYOUT_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const THEME: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Plain"><a:themeElements><a:clrScheme name="Plain"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Plain"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Plain"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;
