use crate::config::EngineConfig;

use super::Rect;

/// Screen reference point used by [`CoordinateSpace::map_reference`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RefPoint {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    /// Treats the coordinates as an object's size and yields the top-left of
    /// that object centred on screen.
    Center,
}

/// Integer scale of one axis: physical = logical * quot + rem.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct AxisScale {
    quot: i32,
    rem: i32,
}

impl AxisScale {
    fn new(logical: i32, physical: i32) -> Self {
        let logical = logical.max(1);
        // A physical axis smaller than the logical one still maps 1:1; the
        // negative remainder then shifts the centred origin off-screen.
        let quot = (physical / logical).max(1);
        let rem = physical - quot * logical;
        Self { quot, rem }
    }

    #[inline]
    fn offset(self) -> i32 {
        self.rem / 2
    }

    #[inline]
    fn scale(self, v: i32, center: bool) -> i32 {
        let scaled = v.saturating_mul(self.quot);
        if center {
            scaled.saturating_add(self.offset())
        } else {
            scaled
        }
    }

    #[inline]
    fn unscale(self, v: i32, decenter: bool) -> i32 {
        let v = if decenter { v.saturating_sub(self.offset()) } else { v };
        v.div_euclid(self.quot)
    }
}

/// Maps between the logical reference screen and the physical target.
///
/// Scale factors are computed once in [`configure`](Self::configure) and shared by
/// [`translate`](Self::translate) and [`detranslate`](Self::detranslate), so the two
/// are exact inverses whenever the physical size is an integer multiple of the
/// logical size. Otherwise detranslation truncates towards the containing logical
/// unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CoordinateSpace {
    logical_w: i32,
    logical_h: i32,
    physical_w: i32,
    physical_h: i32,
    auto_scale: bool,
    x: AxisScale,
    y: AxisScale,
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        let c = EngineConfig::default();
        Self::new(c.logical_width, c.logical_height, c.logical_width, c.logical_height, true)
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

impl CoordinateSpace {
    pub fn new(
        logical_w: u32,
        logical_h: u32,
        physical_w: u32,
        physical_h: u32,
        auto_scale: bool,
    ) -> Self {
        let mut space = Self {
            logical_w: 0,
            logical_h: 0,
            physical_w: 0,
            physical_h: 0,
            auto_scale,
            x: AxisScale { quot: 1, rem: 0 },
            y: AxisScale { quot: 1, rem: 0 },
        };
        space.configure(logical_w, logical_h, physical_w, physical_h, auto_scale);
        space
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.logical_width,
            config.logical_height,
            config.physical_width,
            config.physical_height,
            config.auto_scale,
        )
    }

    /// Stores both resolutions and precomputes per-axis quotient and remainder.
    pub fn configure(
        &mut self,
        logical_w: u32,
        logical_h: u32,
        physical_w: u32,
        physical_h: u32,
        auto_scale: bool,
    ) {
        self.logical_w = to_i32(logical_w).max(1);
        self.logical_h = to_i32(logical_h).max(1);
        self.physical_w = to_i32(physical_w);
        self.physical_h = to_i32(physical_h);
        self.auto_scale = auto_scale;
        self.x = AxisScale::new(self.logical_w, self.physical_w);
        self.y = AxisScale::new(self.logical_h, self.physical_h);

        log::debug!(
            "coords: logical {}x{} -> physical {}x{} (scale {}x{}, margin {}x{}, auto {})",
            self.logical_w,
            self.logical_h,
            self.physical_w,
            self.physical_h,
            self.x.quot,
            self.y.quot,
            self.x.rem,
            self.y.rem,
            self.auto_scale,
        );
    }

    #[inline]
    pub fn auto_scale(&self) -> bool {
        self.auto_scale
    }

    #[inline]
    pub fn logical_size(&self) -> (i32, i32) {
        (self.logical_w, self.logical_h)
    }

    #[inline]
    pub fn physical_size(&self) -> (i32, i32) {
        (self.physical_w, self.physical_h)
    }

    /// Integer scale factor per axis.
    #[inline]
    pub fn scale(&self) -> (i32, i32) {
        (self.x.quot, self.y.quot)
    }

    /// Size of the screen application coordinates address: logical when
    /// auto-scaling, physical otherwise.
    #[inline]
    pub fn screen_size(&self) -> (i32, i32) {
        if self.auto_scale {
            self.logical_size()
        } else {
            self.physical_size()
        }
    }

    /// Logical → physical.
    ///
    /// `center` adds half the leftover margin; use it for positions, not for
    /// sizes or image-local offsets.
    pub fn translate(&self, x: i32, y: i32, center: bool) -> (i32, i32) {
        if !self.auto_scale {
            return (x, y);
        }
        (self.x.scale(x, center), self.y.scale(y, center))
    }

    /// Physical → logical. Each axis is divided by its own scale factor.
    pub fn detranslate(&self, x: i32, y: i32, decenter: bool) -> (i32, i32) {
        if !self.auto_scale {
            return (x, y);
        }
        (self.x.unscale(x, decenter), self.y.unscale(y, decenter))
    }

    /// Translates a logical rectangle: origin centred, extent scaled.
    pub fn translate_rect(&self, rect: Rect) -> Rect {
        let (x, y) = self.translate(rect.x, rect.y, true);
        let (w, h) = self.translate(rect.w, rect.h, false);
        Rect::new(x, y, w, h)
    }

    /// Physical rectangle covered by the logical screen.
    pub fn logical_bounds(&self) -> Rect {
        if !self.auto_scale {
            return Rect::new(0, 0, self.physical_w, self.physical_h);
        }
        self.translate_rect(Rect::new(0, 0, self.logical_w, self.logical_h))
    }

    /// Re-expresses `(x, y)` given relative to `refpoint` as top-left based
    /// coordinates on the addressable screen.
    pub fn map_reference(&self, x: i32, y: i32, refpoint: RefPoint) -> (i32, i32) {
        let (w, h) = self.screen_size();
        match refpoint {
            RefPoint::TopLeft => (x, y),
            RefPoint::TopRight => (w - x, y),
            RefPoint::BottomLeft => (x, h - y),
            RefPoint::BottomRight => (w - x, h - y),
            RefPoint::Center => ((w - x) / 2, (h - y) / 2),
        }
    }
}
