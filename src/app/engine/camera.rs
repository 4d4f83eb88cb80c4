use std::ops::{Add, Mul, Sub};
use std::time::Duration;

use eframe::egui::{Pos2, Rect, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.02;
pub(in crate::app) const MAX_ZOOM: f32 = 12.0;

/// One in-flight camera animation. The start time is taken from the first
/// frame that sees it, so commands issued between frames need no clock.
#[derive(Clone, Copy, Debug)]
struct Tween<T> {
    from: T,
    to: T,
    duration_secs: f64,
    started_at: Option<f64>,
}

impl<T> Tween<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration_secs: duration.as_secs_f64(),
            started_at: None,
        }
    }

    /// Returns the current value and whether the tween has finished.
    fn sample(&mut self, now: f64) -> (T, bool) {
        let started_at = *self.started_at.get_or_insert(now);
        if self.duration_secs <= f64::EPSILON {
            return (self.to, true);
        }

        let t = ((now - started_at) / self.duration_secs).clamp(0.0, 1.0) as f32;
        if t >= 1.0 {
            return (self.to, true);
        }

        let eased = t * (2.0 - t);
        (self.from + (self.to - self.from) * eased, false)
    }
}

/// View transform of the graph canvas: the world point drawn at the middle of
/// the viewport and the scale applied around it.
#[derive(Clone, Debug)]
pub(in crate::app) struct Camera {
    pub(in crate::app) center: Vec2,
    pub(in crate::app) zoom: f32,
    center_tween: Option<Tween<Vec2>>,
    zoom_tween: Option<Tween<f32>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
            center_tween: None,
            zoom_tween: None,
        }
    }
}

impl Camera {
    pub(in crate::app) fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + (world - self.center) * self.zoom
    }

    pub(in crate::app) fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center()) / self.zoom + self.center
    }

    pub(in crate::app) fn animate_center(&mut self, target: Vec2, duration: Duration) {
        self.center_tween = Some(Tween::new(self.center, target, duration));
    }

    pub(in crate::app) fn animate_zoom(&mut self, zoom: f32, duration: Duration) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom_tween = Some(Tween::new(self.zoom, zoom, duration));
    }

    /// Frames `bounds` (world space) inside `rect`, leaving `padding` screen
    /// pixels on every side.
    pub(in crate::app) fn animate_fit(
        &mut self,
        rect: Rect,
        bounds: Rect,
        padding: f32,
        duration: Duration,
    ) {
        let available = (rect.size() - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
        let extent = bounds.size().max(Vec2::splat(1.0));
        let zoom = (available.x / extent.x).min(available.y / extent.y);

        self.animate_center(bounds.center().to_vec2(), duration);
        self.animate_zoom(zoom, duration);
    }

    pub(in crate::app) fn is_animating(&self) -> bool {
        self.center_tween.is_some() || self.zoom_tween.is_some()
    }

    /// Applies in-flight animations. Returns whether any are still running.
    pub(in crate::app) fn advance(&mut self, now: f64) -> bool {
        if let Some(tween) = self.center_tween.as_mut() {
            let (center, done) = tween.sample(now);
            self.center = center;
            if done {
                self.center_tween = None;
            }
        }

        if let Some(tween) = self.zoom_tween.as_mut() {
            let (zoom, done) = tween.sample(now);
            self.zoom = zoom;
            if done {
                self.zoom_tween = None;
            }
        }

        self.is_animating()
    }

    pub(in crate::app) fn pan_by(&mut self, screen_delta: Vec2) {
        self.center_tween = None;
        self.center -= screen_delta / self.zoom;
    }

    /// Scales around `pointer`, keeping the world point under it in place.
    pub(in crate::app) fn zoom_around(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        self.center_tween = None;
        self.zoom_tween = None;

        let anchor = self.screen_to_world(rect, pointer);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center = anchor - (pointer - rect.center()) / self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn screen_and_world_transforms_are_inverse() {
        let camera = Camera {
            center: vec2(40.0, -25.0),
            zoom: 2.5,
            ..Camera::default()
        };
        let world = vec2(13.0, 7.0);

        let back = camera.screen_to_world(viewport(), camera.world_to_screen(viewport(), world));
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn animation_reaches_its_target_after_the_duration() {
        let mut camera = Camera::default();
        camera.animate_center(vec2(100.0, 50.0), Duration::from_millis(1000));
        camera.animate_zoom(2.5, Duration::from_millis(1000));

        assert!(camera.advance(10.0));
        assert_eq!(camera.center, Vec2::ZERO);

        assert!(camera.advance(10.5));
        assert!(camera.center.x > 50.0 && camera.center.x < 100.0);

        assert!(!camera.advance(11.0));
        assert_eq!(camera.center, vec2(100.0, 50.0));
        assert_eq!(camera.zoom, 2.5);
    }

    #[test]
    fn a_new_command_overwrites_the_running_one() {
        let mut camera = Camera::default();
        camera.animate_center(vec2(100.0, 0.0), Duration::from_millis(1000));
        camera.advance(0.0);
        camera.advance(0.5);

        camera.animate_center(vec2(-20.0, 0.0), Duration::ZERO);
        camera.advance(0.6);
        assert_eq!(camera.center, vec2(-20.0, 0.0));
    }

    #[test]
    fn fit_frames_the_bounds_with_padding() {
        let mut camera = Camera::default();
        let bounds = Rect::from_min_max(pos2(-100.0, -50.0), pos2(100.0, 50.0));
        camera.animate_fit(viewport(), bounds, 50.0, Duration::ZERO);
        camera.advance(0.0);

        assert_eq!(camera.center, Vec2::ZERO);
        assert!((camera.zoom - 3.5).abs() < 1e-4);
    }

    #[test]
    fn zoom_keeps_the_pointer_anchor() {
        let mut camera = Camera::default();
        let pointer = pos2(600.0, 100.0);
        let before = camera.screen_to_world(viewport(), pointer);

        camera.zoom_around(viewport(), pointer, 1.8);
        let after = camera.screen_to_world(viewport(), pointer);
        assert!((after - before).length() < 1e-3);
    }
}
