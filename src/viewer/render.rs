use once_cell::sync::Lazy;
use std::fmt;

use super::camera::Camera;
use crate::models::scene::{ Rgb, Vec3 };
use crate::models::SceneDescription;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedObject {
    pub label: String,
    pub shape: String,
    pub position: Vec3,
    pub scale: Vec3,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub title: String,
    pub objects: Vec<RenderedObject>,
    /// True when the default room is shown instead of a generated scene.
    pub placeholder: bool,
    pub loading_overlay: bool,
    pub camera: Camera,
}

fn part(label: &str, shape: &str, position: [f32; 3], size: [f32; 3], color: &str) -> RenderedObject {
    RenderedObject {
        label: label.to_string(),
        shape: shape.to_string(),
        position: Vec3::new(position[0], position[1], position[2]),
        scale: Vec3::new(size[0], size[1], size[2]),
        color: Rgb::parse(color).unwrap_or(Rgb::MID_GRAY),
    }
}

static PLACEHOLDER_ROOM: Lazy<Vec<RenderedObject>> = Lazy::new(|| {
    vec![
        part("floor", "plane", [0.0, -0.5, 0.0], [10.0, 10.0, 1.0], "#f3f4f6"),
        part("back wall", "box", [0.0, 2.0, -5.0], [10.0, 5.0, 0.1], "#e5e7eb"),
        part("side wall", "box", [-5.0, 2.0, 0.0], [10.0, 5.0, 0.1], "#d1d5db"),
        part("table", "box", [0.0, 0.4, 0.0], [1.5, 0.1, 0.8], "#9b87f5"),
        part("table leg", "box", [0.65, 0.0, 0.25], [0.08, 0.8, 0.08], "#7e69ab"),
        part("table leg", "box", [-0.65, 0.0, 0.25], [0.08, 0.8, 0.08], "#7e69ab"),
        part("table leg", "box", [0.65, 0.0, -0.25], [0.08, 0.8, 0.08], "#7e69ab"),
        part("table leg", "box", [-0.65, 0.0, -0.25], [0.08, 0.8, 0.08], "#7e69ab"),
        part("chair seat", "box", [0.0, 0.45, 1.2], [0.8, 0.1, 0.8], "#6e59a5"),
        part("chair back", "box", [0.0, 1.0, 1.6], [0.8, 1.0, 0.1], "#6e59a5"),
        part("chair leg", "box", [0.35, 0.0, 1.5], [0.05, 0.9, 0.05], "#6e59a5"),
        part("chair leg", "box", [-0.35, 0.0, 1.5], [0.05, 0.9, 0.05], "#6e59a5"),
        part("chair leg", "box", [0.35, 0.0, 0.9], [0.05, 0.9, 0.05], "#6e59a5"),
        part("chair leg", "box", [-0.35, 0.0, 0.9], [0.05, 0.9, 0.05], "#6e59a5"),
        part("plant pot", "cylinder", [3.0, 0.5, -3.0], [0.4, 1.0, 0.4], "#d6bcfa"),
        part("plant leaves", "hemisphere", [3.0, 1.1, -3.0], [0.5, 0.5, 0.5], "#34d399")
    ]
});

pub fn placeholder_room() -> &'static [RenderedObject] {
    &PLACEHOLDER_ROOM
}

/// Applies per-object defaults. Pure, so the same scene always resolves to the
/// same objects.
pub fn resolve_scene(scene: &SceneDescription) -> Vec<RenderedObject> {
    scene.objects
        .iter()
        .enumerate()
        .map(|(i, obj)| RenderedObject {
            label: obj
                .name()
                .or_else(|| obj.shape())
                .map(str::to_string)
                .unwrap_or_else(|| format!("object-{}", i + 1)),
            shape: obj.shape().unwrap_or("box").to_string(),
            position: obj.position(),
            scale: obj.scale(),
            color: obj.color(),
        })
        .collect()
}

pub fn build_frame(scene: Option<&SceneDescription>, loading: bool, camera: Camera) -> RenderFrame {
    match scene.filter(|s| !s.is_empty()) {
        Some(scene) =>
            RenderFrame {
                title: scene.name.clone(),
                objects: resolve_scene(scene),
                placeholder: false,
                loading_overlay: loading,
                camera,
            },
        None =>
            RenderFrame {
                title: "默认房间".to_string(),
                objects: placeholder_room().to_vec(),
                placeholder: true,
                loading_overlay: loading,
                camera,
            },
    }
}

impl fmt::Display for RenderFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ({} objects){}", self.title, self.objects.len(), if self.placeholder {
            " [placeholder]"
        } else {
            ""
        })?;
        for obj in &self.objects {
            writeln!(
                f,
                "  - {:<14} {:<10} pos {} scale {} color {}",
                obj.label,
                obj.shape,
                obj.position,
                obj.scale,
                obj.color
            )?;
        }
        write!(f, "  camera at {} (distance {:.2})", self.camera.position, self.camera.distance())?;
        if self.loading_overlay {
            write!(f, "\n  [正在生成场景...]")?;
        }
        Ok(())
    }
}
