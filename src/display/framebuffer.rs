use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use super::{Display, DisplayError};

const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb565,
    Bgra8888,
}

impl PixelFormat {
    pub fn from_depth(bits_per_pixel: usize) -> Result<Self, DisplayError> {
        match bits_per_pixel {
            16 => Ok(Self::Rgb565),
            32 => Ok(Self::Bgra8888),
            other => Err(DisplayError::UnsupportedDepth(other)),
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Bgra8888 => 4,
        }
    }

    /// Convert one premultiplied RGBA pixel. The canvas is opaque, so alpha is dropped.
    pub fn encode(self, rgba: &[u8], out: &mut [u8]) {
        let (r, g, b) = (rgba[0], rgba[1], rgba[2]);
        match self {
            Self::Rgb565 => {
                let packed =
                    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3);
                out[..2].copy_from_slice(&packed.to_le_bytes());
            }
            Self::Bgra8888 => out[..4].copy_from_slice(&[b, g, r, 0xFF]),
        }
    }
}

/// A Linux fbdev panel such as the small HDMI or SPI screens sold for the Raspberry Pi.
/// The geometry is read from sysfs; frames larger than the panel are clipped.
pub struct Framebuffer {
    file: File,
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    buffer: Vec<u8>,
}

impl Framebuffer {
    pub fn open(device: &Path) -> Result<Self, DisplayError> {
        let name = device
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DisplayError::Attribute {
                attribute: "device",
                value: device.display().to_string(),
            })?;
        let attributes = Path::new(SYSFS_GRAPHICS).join(name);

        let format = PixelFormat::from_depth(parse_number(
            "bits_per_pixel",
            &fs::read_to_string(attributes.join("bits_per_pixel"))?,
        )?)?;
        let stride = parse_number("stride", &fs::read_to_string(attributes.join("stride"))?)?;
        let (width, height) =
            parse_size(&fs::read_to_string(attributes.join("virtual_size"))?)?;

        log::info!(
            "Opened {} ({}x{}, {:?}, stride {})",
            device.display(),
            width,
            height,
            format,
            stride
        );

        Ok(Self {
            file: OpenOptions::new().write(true).open(device)?,
            width,
            height,
            stride,
            format,
            buffer: vec![0; stride * height],
        })
    }
}

impl Display for Framebuffer {
    fn present(&mut self, frame: &[u8], width: usize, height: usize) -> Result<(), DisplayError> {
        let rows = encode_frame(
            frame,
            (width, height),
            self.format,
            (self.width, self.height),
            self.stride,
            &mut self.buffer,
        );

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.buffer[..rows * self.stride])?;
        Ok(())
    }
}

/// Encode the visible part of `frame` into `buffer`, returning the number of rows
/// written.
fn encode_frame(
    frame: &[u8],
    (width, height): (usize, usize),
    format: PixelFormat,
    (panel_width, panel_height): (usize, usize),
    stride: usize,
    buffer: &mut [u8],
) -> usize {
    let bytes_per_pixel = format.bytes_per_pixel();
    let columns = width.min(panel_width).min(stride / bytes_per_pixel);
    let rows = height.min(panel_height).min(buffer.len() / stride.max(1));

    for y in 0..rows {
        let source = &frame[y * width * 4..(y * width + columns) * 4];
        let target = &mut buffer[y * stride..y * stride + columns * bytes_per_pixel];

        for (pixel, out) in source
            .chunks_exact(4)
            .zip(target.chunks_exact_mut(bytes_per_pixel))
        {
            format.encode(pixel, out);
        }
    }

    rows
}

fn parse_number(attribute: &'static str, value: &str) -> Result<usize, DisplayError> {
    value.trim().parse().map_err(|_| DisplayError::Attribute {
        attribute,
        value: value.trim().to_string(),
    })
}

fn parse_size(value: &str) -> Result<(usize, usize), DisplayError> {
    let mut parts = value.trim().splitn(2, ',');
    match (parts.next(), parts.next()) {
        (Some(width), Some(height)) => Ok((
            parse_number("virtual_size", width)?,
            parse_number("virtual_size", height)?,
        )),
        _ => Err(DisplayError::Attribute {
            attribute: "virtual_size",
            value: value.trim().to_string(),
        }),
    }
}
