use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::fmt;

use super::null_as_default;

/// A named collection of object placements, lighting and camera settings, as
/// returned by the scene service. Everything below `objects` is kept loosely
/// typed; defaults are applied when the scene is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub lighting: Value,
    #[serde(default)]
    pub camera: Value,
}

impl SceneDescription {
    /// A scene with no objects renders as the placeholder room.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One placement record. The service has no fixed schema for these, so the
/// raw JSON is kept and read through the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneObject(pub Value);

impl SceneObject {
    pub fn name(&self) -> Option<&str> {
        self.str_field("name").or_else(|| self.str_field("id"))
    }

    pub fn shape(&self) -> Option<&str> {
        self.str_field("type").or_else(|| self.str_field("shape"))
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_json(self.0.get("position"), Vec3::ZERO)
    }

    pub fn scale(&self) -> Vec3 {
        Vec3::from_json(self.0.get("scale"), Vec3::ONE)
    }

    /// `material.color` wins over a top-level `color`.
    pub fn color(&self) -> Rgb {
        self.0
            .get("material")
            .and_then(|m| m.get("color"))
            .or_else(|| self.0.get("color"))
            .and_then(Value::as_str)
            .and_then(Rgb::parse)
            .unwrap_or(Rgb::MID_GRAY)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn lerp(self, target: Vec3, t: f32) -> Self {
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.z + (target.z - self.z) * t
        )
    }

    /// Reads `[x, y, z]` or `{x, y, z}`. Each missing or non-numeric component
    /// falls back to the matching component of `default`.
    pub fn from_json(value: Option<&Value>, default: Vec3) -> Self {
        let component = |v: Option<&Value>, d: f32| {
            v.and_then(Value::as_f64)
                .map(|n| n as f32)
                .unwrap_or(d)
        };
        match value {
            Some(Value::Array(items)) =>
                Self::new(
                    component(items.first(), default.x),
                    component(items.get(1), default.y),
                    component(items.get(2), default.z)
                ),
            Some(Value::Object(map)) =>
                Self::new(
                    component(map.get("x"), default.x),
                    component(map.get("y"), default.y),
                    component(map.get("z"), default.z)
                ),
            _ => default,
        }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const MID_GRAY: Rgb = Rgb(0x80, 0x80, 0x80);

    /// Parses `#rrggbb` or `#rgb`; the leading `#` is optional.
    pub fn parse(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17)
                };
                Some(Rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
