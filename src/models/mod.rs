pub mod api;
pub mod chat;
pub mod scene;

pub use api::ApiEnvelope;
pub use chat::{ ChatMessage, ContextTurn, Notification };
pub use scene::SceneDescription;

use serde::{ Deserialize, Deserializer };

/// Reads an explicit `null` the same as a missing field. The service is
/// loosely typed and sends `null` for fields it has no value for.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where D: Deserializer<'de>, T: Default + Deserialize<'de>
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
