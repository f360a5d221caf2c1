use std::sync::{ Arc, Mutex, PoisonError };

use crate::models::scene::Vec3;

pub const HOME_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);
const ZOOM_IN_FACTOR: f32 = 0.8;
const ZOOM_OUT_FACTOR: f32 = 1.2;
const ZOOM_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self { position: HOME_POSITION, target: Vec3::ZERO }
    }
}

impl Camera {
    pub fn reset(&mut self) {
        *self = Camera::default();
    }

    /// Moves half way toward 0.8x the current position.
    pub fn zoom_in(&mut self) {
        self.position = self.position.lerp(self.position.scaled(ZOOM_IN_FACTOR), ZOOM_STEP);
    }

    /// Moves half way toward 1.2x the current position.
    pub fn zoom_out(&mut self) {
        self.position = self.position.lerp(self.position.scaled(ZOOM_OUT_FACTOR), ZOOM_STEP);
    }

    pub fn distance(&self) -> f32 {
        let d = Vec3::new(
            self.position.x - self.target.x,
            self.position.y - self.target.y,
            self.position.z - self.target.z
        );
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }
}

/// Camera controls handed out by the viewer. Clones share one camera, so the
/// holder can drive it without touching the view state.
#[derive(Debug, Clone, Default)]
pub struct CameraHandle {
    inner: Arc<Mutex<Camera>>,
}

impl CameraHandle {
    pub fn reset_view(&self) {
        self.with(Camera::reset);
    }

    pub fn zoom_in(&self) {
        self.with(Camera::zoom_in);
    }

    pub fn zoom_out(&self) {
        self.with(Camera::zoom_out);
    }

    pub fn snapshot(&self) -> Camera {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with(&self, op: impl FnOnce(&mut Camera)) {
        let mut camera = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        op(&mut camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn zoom_in_then_reset() {
        let handle = CameraHandle::default();
        handle.zoom_in();
        let cam = handle.snapshot();
        assert!(close(cam.position.x, 4.5));
        assert!(cam.distance() < Camera::default().distance());

        handle.reset_view();
        assert_eq!(handle.snapshot(), Camera::default());
    }

    #[test]
    fn zoom_out_moves_away() {
        let handle = CameraHandle::default();
        handle.zoom_out();
        assert!(close(handle.snapshot().position.y, 5.5));
    }

    #[test]
    fn clones_share_the_camera() {
        let handle = CameraHandle::default();
        let held = handle.clone();
        held.zoom_in();
        assert_eq!(handle.snapshot(), held.snapshot());
    }
}
