//! Zoom level and horizontal viewport, with eased transitions.
//!
//! The controller holds a single animation slot. Starting a new zoom replaces
//! whatever animation was running, starting from the value the old one had
//! reached at that instant. The host drives frames by calling
//! [`ZoomController::tick`] and stops when it returns [`ZoomPhase::Idle`].

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::EditorConfig;
use crate::coords::CoordinateMapper;

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    /// Horizontal scroll in pixels, never negative.
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPhase {
    Idle,
    Animating,
}

#[derive(Debug, Clone, Copy)]
struct ZoomAnimation {
    from: Viewport,
    to: Viewport,
    started_at: Instant,
    duration: Duration,
}

impl ZoomAnimation {
    fn sample(&self, now: Instant) -> (Viewport, bool) {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.duration.is_zero() || elapsed >= self.duration {
            return (self.to, true);
        }
        let t = ease_out_cubic(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        (
            Viewport {
                zoom: lerp(self.from.zoom, self.to.zoom),
                offset: lerp(self.from.offset, self.to.offset),
            },
            false,
        )
    }
}

#[derive(Debug)]
pub struct ZoomController {
    base_pixels_per_second: f64,
    min_zoom: f64,
    max_zoom: f64,
    step: f64,
    wheel_sensitivity: f64,
    animation_duration: Duration,
    current: Viewport,
    animation: Option<ZoomAnimation>,
}

impl ZoomController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            base_pixels_per_second: config.base_pixels_per_second,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            step: config.zoom_step,
            wheel_sensitivity: config.wheel_sensitivity,
            animation_duration: Duration::from_millis(config.zoom_animation_ms),
            current: Viewport {
                zoom: config.clamp_zoom(1.0),
                offset: 0.0,
            },
            animation: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.current
    }

    pub fn zoom_level(&self) -> f64 {
        self.current.zoom
    }

    /// Where the running animation will land, or the current viewport.
    pub fn target(&self) -> Viewport {
        self.animation.map_or(self.current, |a| a.to)
    }

    pub fn phase(&self) -> ZoomPhase {
        if self.animation.is_some() {
            ZoomPhase::Animating
        } else {
            ZoomPhase::Idle
        }
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.base_pixels_per_second, self.current.zoom)
            .with_offset(self.current.offset)
    }

    fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    pub fn zoom_in(&mut self, now: Instant) -> ZoomPhase {
        self.settle(now);
        let target = self.clamp(self.current.zoom * self.step);
        self.animate_to(target, self.current.offset, now)
    }

    pub fn zoom_out(&mut self, now: Instant) -> ZoomPhase {
        self.settle(now);
        let target = self.clamp(self.current.zoom / self.step);
        self.animate_to(target, self.current.offset, now)
    }

    pub fn set_zoom_level(&mut self, zoom: f64, smooth: bool, now: Instant) -> ZoomPhase {
        self.settle(now);
        let zoom = self.clamp(zoom);
        if smooth {
            self.animate_to(zoom, self.current.offset, now)
        } else {
            self.animation = None;
            self.current.zoom = zoom;
            ZoomPhase::Idle
        }
    }

    /// Exponential wheel zoom. With an anchor (pixel within the viewport) the
    /// time under that pixel stays under it once the zoom lands.
    pub fn handle_wheel_zoom(&mut self, delta: f64, anchor_px: Option<f64>, now: Instant) -> ZoomPhase {
        self.settle(now);
        let multiplier = (-delta * self.wheel_sensitivity).exp();
        let zoom = self.clamp(self.current.zoom * multiplier);
        let offset = match anchor_px {
            Some(px) => {
                let anchor_time = self.mapper().pixel_to_time(px);
                (anchor_time * self.base_pixels_per_second * zoom - px).max(0.0)
            }
            None => self.current.offset,
        };
        self.animate_to(zoom, offset, now)
    }

    /// Scrolling applies immediately and supersedes any running zoom.
    pub fn set_offset(&mut self, offset: f64) {
        self.animation = None;
        self.current.offset = offset.max(0.0);
    }

    /// Stop the running animation at the value it has reached by `now`, so a
    /// superseding zoom starts from there.
    fn settle(&mut self, now: Instant) {
        if let Some(previous) = self.animation.take() {
            self.current = previous.sample(now).0;
        }
    }

    fn animate_to(&mut self, zoom: f64, offset: f64, now: Instant) -> ZoomPhase {
        self.settle(now);
        let to = Viewport {
            zoom,
            offset: offset.max(0.0),
        };
        if to == self.current {
            return ZoomPhase::Idle;
        }
        debug!(from = self.current.zoom, to = zoom, "zoom animation started");
        self.animation = Some(ZoomAnimation {
            from: self.current,
            to,
            started_at: now,
            duration: self.animation_duration,
        });
        ZoomPhase::Animating
    }

    /// Advance the running animation to `now`. The final frame lands exactly
    /// on the requested target.
    pub fn tick(&mut self, now: Instant) -> ZoomPhase {
        let Some(animation) = self.animation else {
            return ZoomPhase::Idle;
        };
        let (viewport, finished) = animation.sample(now);
        self.current = viewport;
        if finished {
            self.animation = None;
            ZoomPhase::Idle
        } else {
            ZoomPhase::Animating
        }
    }

    /// Drop the running animation, keeping the last rendered value.
    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }
}
