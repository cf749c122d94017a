use std::io;

use piet::{Color, ImageFormat, RenderContext};
use thiserror::Error;

mod framebuffer;

pub use framebuffer::{Framebuffer, PixelFormat};

/// Size of the canvas the pages are laid out on.
pub const DISPLAY_WIDTH: usize = 480;
pub const DISPLAY_HEIGHT: usize = 320;

pub const BACKGROUND: Color = Color::rgb8(0x10, 0x14, 0x1c);

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("rendering failed: {0}")]
    Render(#[from] piet::Error),

    #[error("unreadable framebuffer attribute {attribute}: {value:?}")]
    Attribute {
        attribute: &'static str,
        value: String,
    },

    #[error("unsupported framebuffer depth of {0} bits per pixel")]
    UnsupportedDepth(usize),
}

pub trait Display {
    /// Show a frame. The frame is premultiplied RGBA with dimensions `width` by
    /// `height`, so it has length `width * height * 4`.
    fn present(&mut self, frame: &[u8], width: usize, height: usize) -> Result<(), DisplayError>;

    /// Render a frame with `f` and present it. The canvas is cleared to the background
    /// colour before `f` runs.
    fn draw_context<F: FnOnce(&mut piet_common::Piet)>(
        &mut self,
        device: &mut piet_common::Device,
        f: F,
    ) -> Result<(), DisplayError> {
        let mut bitmap_target = device.bitmap_target(DISPLAY_WIDTH, DISPLAY_HEIGHT, 1.)?;

        {
            let mut render_context = bitmap_target.render_context();
            render_context.clear(None, BACKGROUND);
            f(&mut render_context);
            render_context.finish()?;
        }

        let image = bitmap_target.to_image_buf(ImageFormat::RgbaPremul)?;
        self.present(image.raw_pixels(), DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

/// Discards every frame. Used when running without a panel attached.
#[derive(Debug, Default)]
pub struct Headless {
    frames: u64,
}

impl Display for Headless {
    fn present(&mut self, _frame: &[u8], width: usize, height: usize) -> Result<(), DisplayError> {
        self.frames += 1;
        log::trace!("Discarded {}x{} frame #{}", width, height, self.frames);
        Ok(())
    }
}
