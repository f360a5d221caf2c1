use sceneflow::api::{ new_client, SceneApi };
use sceneflow::chat::state::{ Phase, FALLBACK_MESSAGE, WELCOME_MESSAGE };
use sceneflow::chat::{ ChatSession, SubmitOutcome };
use sceneflow::config::ApiConfig;
use sceneflow::gallery::{ GalleryState, SystemStatus };
use sceneflow::server;
use sceneflow::viewer::SceneViewer;
use std::sync::Arc;

async fn mock_client() -> Arc<dyn SceneApi> {
    let addr = server::spawn("127.0.0.1:0").await.unwrap();
    let config: ApiConfig = format!("http://{}", addr).parse().unwrap();
    new_client(&config)
}

#[tokio::test]
async fn living_room_scenario_against_mock_service() {
    let api = mock_client().await;
    let viewer = Arc::new(SceneViewer::new());
    let mut session = ChatSession::new(api, viewer.clone());
    assert_eq!(session.messages()[0].content, WELCOME_MESSAGE);

    let outcome = session.submit("现代简约风格的客厅，有一张灰色沙发").await;
    assert_eq!(outcome, SubmitOutcome::Replied);
    assert_eq!(session.phase(), Phase::Idle);

    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[1].is_user);
    assert!(!messages[2].is_user);

    let state = viewer.state();
    assert!(!state.loading);
    let frame = viewer.render();
    assert!(!frame.placeholder);
    assert!(frame.objects.iter().any(|o| o.shape == "sofa"));

    // Second turn adds a lamp through scene_update.
    session.submit("再加一盏灯").await;
    assert!(viewer.render().objects.iter().any(|o| o.shape == "lamp"));

    assert!(session.reset());
    assert_eq!(session.messages().len(), 1);
    assert!(viewer.render().placeholder);
}

#[tokio::test]
async fn unreachable_service_yields_fallback() {
    let config: ApiConfig = "http://127.0.0.1:1".parse().unwrap();
    let viewer = Arc::new(SceneViewer::new());
    let mut session = ChatSession::new(new_client(&config), viewer.clone());

    let outcome = session.submit("卧室").await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(session.messages().last().unwrap().content, FALLBACK_MESSAGE);
    assert_eq!(session.take_notifications().len(), 1);
    assert!(!viewer.state().loading);
    assert!(viewer.state().scene.is_none());
}

#[tokio::test]
async fn gallery_probe_against_mock_service() {
    let api = mock_client().await;
    let mut gallery = GalleryState::default();
    gallery.check_health(api.as_ref()).await;
    assert_eq!(gallery.status(), Some(&SystemStatus::Healthy));
    assert_eq!(gallery.status().unwrap().to_string(), "系统状态: 正常");
}
