//! CPU framebuffer driver.
//!
//! Renders into a packed `0x00RRGGBB` back buffer; `update` copies it to the
//! front buffer, which the host reads back (e.g. via [`Framebuffer::as_bytes`])
//! to put on screen. Images are decoded with the `image` crate and blitted
//! with magenta (255, 0, 255) as the transparent colour key.

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};

use crate::config::EngineConfig;
use crate::coords::{Rect, Rgb};

use super::{Driver, ImageBlit, Payload};

pub const NAME: &str = "software";

pub fn register() -> Box<dyn Driver> {
    Box::new(SoftwareDriver::new())
}

/// Decoded image in packed `0x00RRGGBB` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        ensure!(
            pixels.len() == width as usize * height as usize,
            "image of {width}x{height} needs {} pixels, got {}",
            width as usize * height as usize,
            pixels.len()
        );
        Ok(Self { width, height, pixels })
    }

    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color.to_u32(); width as usize * height as usize],
        }
    }

    /// Fully transparent pixels become the colour key.
    pub fn from_rgba(rgba: &image::RgbaImage) -> Self {
        let pixels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                let color = if a == 0 { Rgb::COLOR_KEY } else { Rgb::new(r, g, b) };
                color.to_u32()
            })
            .collect();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("failed to decode image data")?;
        Ok(Self::from_rgba(&img.to_rgba8()))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to open image {}", path.display()))?;
        Ok(Self::from_rgba(&img.to_rgba8()))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Rgb::from_u32(self.pixels[(y * self.width + x) as usize]))
    }
}

/// Packed RGB pixel buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Native-endian bytes of the packed pixels, four per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| Rgb::from_u32(self.pixels[i]))
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color.to_u32());
    }

    /// Fills `rect`, clipped to the buffer.
    pub fn fill(&mut self, rect: Rect, color: Rgb) {
        let Some(clip) = rect.intersect(self.bounds()) else {
            return;
        };
        let packed = color.to_u32();
        let stride = self.width as usize;
        for y in clip.y..clip.bottom() {
            let row = y as usize * stride;
            self.pixels[row + clip.x as usize..row + clip.right() as usize].fill(packed);
        }
    }

    /// Copies a region of `image`, skipping colour-key pixels. The region is
    /// clipped against both the image and the buffer.
    pub fn blit(&mut self, image: &Image, blit: ImageBlit) {
        let x_span = clip_span(blit.src_x, blit.dst_x, blit.w, image.width, self.width);
        let y_span = clip_span(blit.src_y, blit.dst_y, blit.h, image.height, self.height);
        let (Some((sx, dx, w)), Some((sy, dy, h))) = (x_span, y_span) else {
            return;
        };

        let key = Rgb::COLOR_KEY.to_u32();
        let src_stride = image.width as usize;
        let dst_stride = self.width as usize;
        for row in 0..h {
            let src = (sy + row) * src_stride + sx;
            let dst = (dy + row) * dst_stride + dx;
            let src_row = &image.pixels[src..src + w];
            let dst_row = &mut self.pixels[dst..dst + w];
            for (out, &p) in dst_row.iter_mut().zip(src_row) {
                if p != key {
                    *out = p;
                }
            }
        }
    }
}

/// Clips one blit axis against the source and destination extents.
///
/// Returns the source start, destination start and length, or `None` when
/// nothing is left. Computed in `i64` so saturated coordinates cannot overflow.
fn clip_span(
    src: i32,
    dst: i32,
    len: i32,
    src_len: u32,
    dst_len: u32,
) -> Option<(usize, usize, usize)> {
    let (src, dst, len) = (i64::from(src), i64::from(dst), i64::from(len));
    let start = 0i64.max(-src).max(-dst);
    let end = len
        .min(i64::from(src_len) - src)
        .min(i64::from(dst_len) - dst);
    if end <= start {
        return None;
    }
    Some(((src + start) as usize, (dst + start) as usize, (end - start) as usize))
}

/// Software driver state.
#[derive(Debug, Default)]
pub struct SoftwareDriver {
    asset_root: PathBuf,
    back: Framebuffer,
    front: Framebuffer,
    frames_presented: u64,
    /// In-memory assets consulted before the filesystem.
    embedded: HashMap<String, Image>,
    live_images: usize,
}

impl SoftwareDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an in-memory image that `load_resource(key)` returns
    /// instead of reading `asset_root/key`.
    pub fn embed(&mut self, key: impl Into<String>, image: Image) {
        self.embedded.insert(key.into(), image);
    }

    /// Buffer being drawn into.
    pub fn back_buffer(&self) -> &Framebuffer {
        &self.back
    }

    /// Last presented frame.
    pub fn front_buffer(&self) -> &Framebuffer {
        &self.front
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Images loaded and not yet freed.
    pub fn live_images(&self) -> usize {
        self.live_images
    }
}

impl Driver for SoftwareDriver {
    fn init(&mut self, config: &EngineConfig) -> Result<()> {
        ensure!(
            matches!(config.depth, 24 | 32),
            "software driver supports 24 or 32 bpp, got {}",
            config.depth
        );
        ensure!(
            config.physical_width > 0 && config.physical_height > 0,
            "framebuffer has zero size"
        );

        log::debug!(
            "software: {}x{}x{} framebuffer, assets in {}",
            config.physical_width,
            config.physical_height,
            config.depth,
            config.asset_root.display()
        );

        self.asset_root = config.asset_root.clone();
        self.back = Framebuffer::new(config.physical_width, config.physical_height);
        self.front = self.back.clone();
        self.frames_presented = 0;
        Ok(())
    }

    fn update(&mut self) {
        self.front.pixels.copy_from_slice(&self.back.pixels);
        self.frames_presented += 1;
    }

    fn cleanup(&mut self) {
        if self.live_images > 0 {
            log::warn!("software: {} image(s) still loaded at cleanup", self.live_images);
        }
        self.back = Framebuffer::default();
        self.front = Framebuffer::default();
    }

    fn load_resource(&mut self, key: &str) -> Result<Payload> {
        let image = match self.embedded.get(key) {
            Some(image) => image.clone(),
            None => Image::open(&self.asset_root.join(key))?,
        };
        self.live_images += 1;
        Ok(Box::new(image))
    }

    fn free_resource(&mut self, payload: Payload) {
        if payload.downcast::<Image>().is_ok() {
            self.live_images = self.live_images.saturating_sub(1);
        } else {
            log::warn!("software: asked to free a payload it did not create");
        }
    }

    fn draw_image(&mut self, resource: &dyn Any, blit: ImageBlit) -> Result<()> {
        let image = resource
            .downcast_ref::<Image>()
            .context("resource is not a software image")?;
        self.back.blit(image, blit);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.back.fill(rect, color);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
