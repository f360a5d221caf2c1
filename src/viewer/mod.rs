pub mod camera;
pub mod render;

use log::{ debug, info };
use std::sync::{ Mutex, PoisonError };

use crate::models::SceneDescription;
use self::camera::CameraHandle;
use self::render::{ build_frame, RenderFrame };

/// Callbacks through which the chat manager drives the scene view.
pub trait SceneBridge: Send + Sync {
    /// `None` clears the view back to the placeholder room.
    fn on_scene_update(&self, scene: Option<SceneDescription>);

    fn on_loading_change(&self, loading: bool);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub scene: Option<SceneDescription>,
    pub loading: bool,
}

/// Holds the currently displayed scene and the loading overlay flag. The last
/// scene stays on screen while a new one is being generated.
#[derive(Debug, Default)]
pub struct SceneViewer {
    state: Mutex<ViewState>,
    camera: CameraHandle,
}

impl SceneViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera_handle(&self) -> CameraHandle {
        self.camera.clone()
    }

    pub fn state(&self) -> ViewState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn render(&self) -> RenderFrame {
        let state = self.state();
        build_frame(state.scene.as_ref(), state.loading, self.camera.snapshot())
    }
}

impl SceneBridge for SceneViewer {
    fn on_scene_update(&self, scene: Option<SceneDescription>) {
        match &scene {
            Some(s) => info!("Displaying scene '{}' with {} objects", s.name, s.objects.len()),
            None => info!("Scene cleared"),
        }
        self.state.lock().unwrap_or_else(PoisonError::into_inner).scene = scene;
    }

    fn on_loading_change(&self, loading: bool) {
        debug!("Scene loading: {}", loading);
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loading = loading;
    }
}
