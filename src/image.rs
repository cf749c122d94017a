use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use piet::kurbo::Rect;
use piet::{ImageFormat, InterpolationMode, RenderContext};

use crate::cache::ResourceCache;

/// Icons are rasterized once at this height and scaled when drawn.
const RASTER_SIZE: u32 = 128;

/// A rasterized icon in premultiplied RGBA.
pub struct Icon {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Icon {
    pub fn draw<R: RenderContext>(&self, ctx: &mut R, position: Rect) {
        match ctx.make_image(
            self.width,
            self.height,
            &self.pixels,
            ImageFormat::RgbaPremul,
        ) {
            Ok(image) => ctx.draw_image(&image, position, InterpolationMode::Bilinear),
            Err(e) => warn!("Unable to upload icon: {}", e),
        }
    }
}

/// SVG icons keyed by path. An icon that fails to load is remembered as missing, so
/// the file is read at most once either way.
#[derive(Default)]
pub struct ImageCache {
    icons: ResourceCache<PathBuf, Option<Icon>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &Path) -> Option<&Icon> {
        self.icons
            .get_or_load(path.to_path_buf(), |path| {
                load_svg(path)
                    .map_err(|e| warn!("Unable to load icon {}: {}", path.display(), e))
                    .ok()
            })
            .as_ref()
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

fn load_svg(path: &Path) -> Result<Icon, String> {
    let source = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let tree = usvg::Tree::from_str(&source, &usvg::Options::default())
        .map_err(|e| e.to_string())?;
    let pixmap = resvg::render(&tree, usvg::FitTo::Height(RASTER_SIZE), None)
        .ok_or_else(|| "empty image".to_string())?;

    Ok(Icon {
        width: pixmap.width() as usize,
        height: pixmap.height() as usize,
        pixels: pixmap.data().to_vec(),
    })
}
