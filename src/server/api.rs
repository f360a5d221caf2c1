use crate::models::api::{
    ApiEnvelope,
    ChatContext,
    ChatHistoryMessage,
    ChatHistoryResponse,
    ChatMessageResponse,
    GeneratedScene,
    HealthResponse,
    OptimizationResponse,
    OptimizationSuggestion,
};
use crate::models::scene::SceneObject;
use crate::models::{ ContextTurn, SceneDescription };
use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::net::TcpListener;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ Path, State },
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

const NAME_MAX_CHARS: usize = 20;

/// Furniture the mock service knows how to place, keyed by the words that
/// trigger it.
const CATALOG: &[(&[&str], &str, [f32; 3], [f32; 3], &str)] = &[
    (&["沙发", "sofa"], "sofa", [0.0, 0.4, -1.5], [2.0, 0.8, 0.9], "#9ca3af"),
    (&["桌", "table"], "table", [0.0, 0.4, 0.0], [1.5, 0.1, 0.8], "#a16207"),
    (&["床", "bed"], "bed", [0.0, 0.3, -1.0], [1.8, 0.5, 2.1], "#e5e7eb"),
    (&["椅", "chair"], "chair", [0.0, 0.45, 1.2], [0.8, 0.9, 0.8], "#6e59a5"),
    (&["灯", "lamp"], "lamp", [1.5, 1.2, -1.5], [0.3, 1.6, 0.3], "#fde68a"),
    (&["植物", "plant"], "plant", [3.0, 0.5, -3.0], [0.5, 1.0, 0.5], "#34d399"),
];

#[derive(Deserialize)]
pub struct GenerateSceneBody {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: Vec<ContextTurn>,
}

#[derive(Deserialize)]
pub struct OptimizeSceneBody {
    #[serde(default)]
    pub scene: SceneDescription,
}

#[derive(Deserialize)]
pub struct ChatMessageBody {
    pub conversation_id: String,
    pub message: String,
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Clone, Default)]
pub struct MockState {
    history: Arc<Mutex<HashMap<String, Vec<ChatHistoryMessage>>>>,
}

pub fn router(state: MockState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/generate-scene", post(generate_scene_handler))
        .route("/api/scenes/optimize", post(optimize_scene_handler))
        .route("/api/chat/message", post(chat_message_handler))
        .route("/api/chat/history/{conversation_id}", get(chat_history_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and serves in the background; returns the bound address so
/// callers can pass port 0.
pub async fn spawn(addr: &str) -> Result<SocketAddr, Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(MockState::default());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            error!("Mock scene service error: {}", e);
        }
    });

    info!("Mock scene service listening on: http://{}", local);
    Ok(local)
}

pub async fn serve(addr: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await.map_err(|e|
        format!("Failed to bind mock scene service to {}: {}. Try a different port.", addr, e)
    )?;
    info!("Mock scene service listening on: http://{}", listener.local_addr()?);
    axum::serve(listener, router(MockState::default()).into_make_service()).await?;
    Ok(())
}

pub fn build_scene(description: &str) -> SceneDescription {
    let lowered = description.to_lowercase();
    let mut objects = vec![
        SceneObject(
            json!({
            "name": "floor",
            "type": "plane",
            "position": [0, -0.5, 0],
            "scale": [10, 10, 1],
            "material": { "color": "#f3f4f6" }
        })
        )
    ];
    for (keywords, kind, position, scale, color) in CATALOG {
        if keywords.iter().any(|k| lowered.contains(k)) {
            objects.push(
                SceneObject(
                    json!({
                    "name": kind,
                    "type": kind,
                    "position": position,
                    "scale": scale,
                    "material": { "color": color }
                })
                )
            );
        }
    }

    SceneDescription {
        name: description.trim().chars().take(NAME_MAX_CHARS).collect(),
        objects,
        lighting: json!({ "type": "ambient", "intensity": 0.6 }),
        camera: json!({ "position": [5, 5, 5], "fov": 50 }),
    }
}

fn suggestions_for(scene: &SceneDescription) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();
    if scene.lighting.is_null() {
        suggestions.push(OptimizationSuggestion {
            kind: "lighting".into(),
            content: "场景缺少灯光设置，建议添加环境光与主光源。".into(),
        });
    }
    if scene.objects.len() < 3 {
        suggestions.push(OptimizationSuggestion {
            kind: "layout".into(),
            content: "场景对象较少，可以添加装饰品或植物丰富空间。".into(),
        });
    }
    suggestions.push(OptimizationSuggestion {
        kind: "material".into(),
        content: "统一主要家具的材质色调，使整体风格更协调。".into(),
    });
    suggestions
}

async fn generate_scene_handler(Json(body): Json<GenerateSceneBody>) -> Json<
    ApiEnvelope<GeneratedScene>
> {
    if body.description.trim().is_empty() {
        return Json(ApiEnvelope::failure(400, "description is required"));
    }
    info!("Generating mock scene ({} context turns)", body.context.len());
    Json(ApiEnvelope::success(GeneratedScene { scene: Some(build_scene(&body.description)) }))
}

async fn optimize_scene_handler(Json(body): Json<OptimizeSceneBody>) -> Json<
    ApiEnvelope<OptimizationResponse>
> {
    Json(ApiEnvelope::success(OptimizationResponse { suggestions: suggestions_for(&body.scene) }))
}

async fn chat_message_handler(
    State(state): State<MockState>,
    Json(body): Json<ChatMessageBody>
) -> Json<ApiEnvelope<ChatMessageResponse>> {
    let reply = format!("已根据您的描述「{}」更新场景。", body.message.trim());

    // A lamp request on top of an existing scene comes back as a scene update.
    let lowered = body.message.to_lowercase();
    let scene_update = body.context.current_scene
        .filter(|_| lowered.contains("灯") || lowered.contains("lamp"))
        .map(|mut scene| {
            scene.objects.push(
                SceneObject(
                    json!({
                    "name": "lamp",
                    "type": "lamp",
                    "position": [1.5, 1.2, -1.5],
                    "material": { "color": "#fde68a" }
                })
                )
            );
            scene
        });

    let now = Utc::now().to_rfc3339();
    let mut history = state.history.lock().await;
    let turns = history.entry(body.conversation_id).or_default();
    turns.push(ChatHistoryMessage {
        role: "user".into(),
        content: body.message,
        timestamp: now.clone(),
    });
    turns.push(ChatHistoryMessage {
        role: "assistant".into(),
        content: reply.clone(),
        timestamp: now,
    });

    Json(ApiEnvelope::success(ChatMessageResponse { response: reply, scene_update }))
}

async fn chat_history_handler(
    State(state): State<MockState>,
    Path(conversation_id): Path<String>
) -> Json<ApiEnvelope<ChatHistoryResponse>> {
    let history = state.history.lock().await.get(&conversation_id).cloned().unwrap_or_default();
    Json(ApiEnvelope::success(ChatHistoryResponse { history }))
}

async fn health_handler() -> Json<ApiEnvelope<HealthResponse>> {
    Json(
        ApiEnvelope::success(HealthResponse {
            status: "healthy".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{ to_bytes, Body };
    use axum::http::{ Request, StatusCode };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    async fn call<T: DeserializeOwned>(app: Router, req: Request<Body>) -> ApiEnvelope<T> {
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn keywords_place_furniture() {
        let scene = build_scene("现代简约风格的客厅，有一张灰色沙发和一盏落地灯");
        let kinds: Vec<_> = scene.objects
            .iter()
            .filter_map(|o| o.shape())
            .collect();
        assert_eq!(kinds, vec!["plane", "sofa", "lamp"]);
        assert_eq!(scene.name.chars().count(), NAME_MAX_CHARS);
    }

    #[tokio::test]
    async fn blank_description_is_rejected_in_envelope() {
        let app = router(MockState::default());
        let env: ApiEnvelope<GeneratedScene> = call(
            app,
            post_json("/api/generate-scene", json!({ "description": " ", "context": [] }))
        ).await;
        assert_eq!(env.code, 400);
        assert!(env.data.is_none());
    }

    #[tokio::test]
    async fn chat_turns_show_up_in_history() {
        let state = MockState::default();
        let _: ApiEnvelope<ChatMessageResponse> = call(
            router(state.clone()),
            post_json(
                "/api/chat/message",
                json!({ "conversation_id": "c-1", "message": "你好", "context": {} })
            )
        ).await;

        let env: ApiEnvelope<ChatHistoryResponse> = call(
            router(state),
            Request::get("/api/chat/history/c-1").body(Body::empty()).unwrap()
        ).await;
        let history = env.into_data().unwrap().history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");
    }

    #[tokio::test]
    async fn lamp_request_returns_scene_update() {
        let app = router(MockState::default());
        let scene = build_scene("卧室 床");
        let env: ApiEnvelope<ChatMessageResponse> = call(
            app,
            post_json(
                "/api/chat/message",
                json!({
                    "conversation_id": "c-2",
                    "message": "加一盏灯",
                    "context": { "previous_messages": [], "current_scene": scene }
                })
            )
        ).await;
        let update = env.into_data().unwrap().scene_update.unwrap();
        assert_eq!(update.objects.len(), 3);
    }

    #[tokio::test]
    async fn optimize_flags_sparse_unlit_scene() {
        let app = router(MockState::default());
        let env: ApiEnvelope<OptimizationResponse> = call(
            app,
            post_json("/api/scenes/optimize", json!({ "scene": { "name": "空", "objects": [] } }))
        ).await;
        let kinds: Vec<_> = env
            .into_data()
            .unwrap()
            .suggestions.into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(kinds, vec!["lighting", "layout", "material"]);
    }
}
