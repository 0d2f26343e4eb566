//! Time ↔ pixel mapping under zoom and horizontal scroll.

/// Linear, invertible mapping between timeline seconds and horizontal pixels.
///
/// `time_to_pixel(t) = t * base_pixels_per_second * zoom - viewport_offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub base_pixels_per_second: f64,
    pub zoom: f64,
    /// Horizontal scroll in pixels.
    pub viewport_offset: f64,
}

impl CoordinateMapper {
    pub fn new(base_pixels_per_second: f64, zoom: f64) -> Self {
        Self {
            base_pixels_per_second,
            zoom,
            viewport_offset: 0.0,
        }
    }

    pub fn with_offset(mut self, viewport_offset: f64) -> Self {
        self.viewport_offset = viewport_offset;
        self
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.base_pixels_per_second * self.zoom
    }

    pub fn time_to_pixel(&self, t: f64) -> f64 {
        t * self.pixels_per_second() - self.viewport_offset
    }

    pub fn pixel_to_time(&self, px: f64) -> f64 {
        (px + self.viewport_offset) / self.pixels_per_second()
    }

    /// Convert a pointer travel distance to seconds; offset does not apply.
    pub fn delta_to_time(&self, dx: f64) -> f64 {
        dx / self.pixels_per_second()
    }
}
