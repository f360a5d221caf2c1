use futures::StreamExt;
use log::{ info, warn };
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, BufReader };
use tokio_stream::wrappers::SplitStream;

use crate::api::SceneApi;
use crate::chat::{ ChatSession, SubmitOutcome };
use crate::gallery::GalleryState;
use crate::models::chat::NotificationLevel;
use crate::models::{ ChatMessage, Notification, SceneDescription };
use crate::viewer::camera::CameraHandle;
use crate::viewer::SceneViewer;

const SUGGESTION_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Reset,
    View,
    ResetView,
    ZoomIn,
    ZoomOut,
    History,
    Health,
    Optimize,
    Quit,
}

const COMMANDS: &[(&str, SlashCommand, &str)] = &[
    ("help", SlashCommand::Help, "显示可用命令"),
    ("reset", SlashCommand::Reset, "重置对话并清空场景"),
    ("view", SlashCommand::View, "显示当前场景"),
    ("reset-view", SlashCommand::ResetView, "重置相机视角"),
    ("zoom-in", SlashCommand::ZoomIn, "放大"),
    ("zoom-out", SlashCommand::ZoomOut, "缩小"),
    ("history", SlashCommand::History, "查看服务端保存的对话记录"),
    ("health", SlashCommand::Health, "检查服务状态"),
    ("optimize", SlashCommand::Optimize, "获取当前场景的优化建议"),
    ("quit", SlashCommand::Quit, "退出"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Blank,
    Message(String),
    Command(SlashCommand),
    Unknown {
        given: String,
        suggestion: Option<&'static str>,
    },
}

pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Blank;
    }
    let Some(name) = trimmed.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };
    let name = name.trim().to_lowercase();
    if let Some((_, command, _)) = COMMANDS.iter().find(|(n, _, _)| *n == name) {
        return Input::Command(*command);
    }

    let suggestion = COMMANDS.iter()
        .map(|(n, _, _)| (*n, strsim::jaro_winkler(n, &name)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n);
    Input::Unknown { given: name, suggestion }
}

fn print_help() {
    println!("直接输入场景描述即可生成场景。可用命令:");
    for (name, _, about) in COMMANDS {
        println!("  /{:<11} {}", name, about);
    }
}

fn print_message(message: &ChatMessage) {
    let who = if message.is_user { "你" } else { "SceneFlow" };
    println!("[{}] {}: {}", message.timestamp, who, message.content);
}

fn print_notifications(notifications: Vec<Notification>) {
    for note in notifications {
        let tag = match note.level {
            NotificationLevel::Success => "成功",
            NotificationLevel::Error => "错误",
        };
        println!("[{}] {}: {}", tag, note.title, note.description);
    }
}

/// Interactive chat over any line source. Each submission is awaited before
/// the next line is read, so input is effectively disabled while sending.
pub struct ChatRepl {
    api: Arc<dyn SceneApi>,
    viewer: Arc<SceneViewer>,
    camera: CameraHandle,
    session: ChatSession,
    printed: usize,
}

impl ChatRepl {
    pub fn new(api: Arc<dyn SceneApi>) -> Self {
        let viewer = Arc::new(SceneViewer::new());
        let camera = viewer.camera_handle();
        let session = ChatSession::new(api.clone(), viewer.clone());
        Self { api, viewer, camera, session, printed: 0 }
    }

    pub async fn run<R: AsyncBufRead + Unpin>(
        &mut self,
        input: R
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.flush();
        println!("输入 /help 查看命令。");

        let mut lines = SplitStream::new(input.split(b'\n'));
        while let Some(bytes) = lines.next().await {
            let line = match String::from_utf8(bytes?) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping input line that is not valid UTF-8: {}", e);
                    continue;
                }
            };
            if !self.handle_line(line.trim_end_matches('\r')).await {
                break;
            }
        }
        info!("Chat session {} closed", self.session.conversation_id());
        Ok(())
    }

    /// Returns `false` once the user asks to quit.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        match parse_input(line) {
            Input::Blank => {}
            Input::Message(text) => {
                if let SubmitOutcome::Failed(e) = self.session.submit(&text).await {
                    warn!("{}", e);
                }
                self.flush();
                println!("{}", self.viewer.render());
            }
            Input::Command(SlashCommand::Quit) => {
                return false;
            }
            Input::Command(command) => self.run_command(command).await,
            Input::Unknown { given, suggestion } =>
                match suggestion {
                    Some(s) => println!("未知命令 /{}，您是不是想输入 /{}？", given, s),
                    None => println!("未知命令 /{}，输入 /help 查看命令。", given),
                }
        }
        true
    }

    async fn run_command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::Help => print_help(),
            SlashCommand::Reset => {
                if self.session.reset() {
                    self.printed = 0;
                }
                self.flush();
            }
            SlashCommand::View => println!("{}", self.viewer.render()),
            SlashCommand::ResetView => {
                self.camera.reset_view();
                println!("{}", self.viewer.render());
            }
            SlashCommand::ZoomIn => {
                self.camera.zoom_in();
                println!("{}", self.viewer.render());
            }
            SlashCommand::ZoomOut => {
                self.camera.zoom_out();
                println!("{}", self.viewer.render());
            }
            SlashCommand::History => {
                print_history(self.api.as_ref(), self.session.conversation_id()).await;
            }
            SlashCommand::Health => print_health(self.api.as_ref()).await,
            SlashCommand::Optimize =>
                match self.viewer.state().scene {
                    Some(scene) => print_suggestions(self.api.as_ref(), &scene).await,
                    None => println!("当前没有可优化的场景。"),
                }
            SlashCommand::Quit => {}
        }
    }

    /// One exchange for a description given on the command line. The text is
    /// always sent as a message, even when it starts with '/'.
    pub async fn describe(&mut self, description: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.flush();
        if self.session.submit(description).await == SubmitOutcome::Rejected {
            return Err("scene description must not be empty".into());
        }
        self.flush();
        println!("{}", self.viewer.render());
        Ok(())
    }

    fn flush(&mut self) {
        let messages = self.session.messages();
        for message in &messages[self.printed.min(messages.len())..] {
            print_message(message);
        }
        self.printed = messages.len();
        print_notifications(self.session.take_notifications());
    }
}

pub async fn run_chat(api: Arc<dyn SceneApi>) -> Result<(), Box<dyn Error + Send + Sync>> {
    ChatRepl::new(api).run(BufReader::new(tokio::io::stdin())).await
}

pub async fn generate(
    api: Arc<dyn SceneApi>,
    description: &str
) -> Result<(), Box<dyn Error + Send + Sync>> {
    ChatRepl::new(api).describe(description).await
}

async fn print_history(api: &dyn SceneApi, conversation_id: &str) {
    let envelope = api.get_chat_history(conversation_id).await;
    if !envelope.is_success() {
        println!("[错误] 获取对话记录失败: {}", envelope.message);
        return;
    }
    let history = envelope.into_data().unwrap_or_default().history;
    if history.is_empty() {
        println!("对话 {} 暂无记录。", conversation_id);
    }
    for turn in history {
        println!("[{}] {}: {}", turn.timestamp, turn.role, turn.content);
    }
}

async fn print_health(api: &dyn SceneApi) {
    let envelope = api.get_system_health().await;
    match envelope.into_data() {
        Some(health) => println!("服务状态: {} (版本 {})", health.status, health.version),
        None => println!("服务不可用"),
    }
}

async fn print_suggestions(api: &dyn SceneApi, scene: &SceneDescription) {
    let envelope = api.optimize_scene(scene).await;
    if !envelope.is_success() {
        println!("[错误] 获取优化建议失败: {}", envelope.message);
        return;
    }
    for suggestion in envelope.into_data().unwrap_or_default().suggestions {
        println!("  [{}] {}", suggestion.kind, suggestion.content);
    }
}

pub async fn history(
    api: Arc<dyn SceneApi>,
    conversation_id: &str
) -> Result<(), Box<dyn Error + Send + Sync>> {
    print_history(api.as_ref(), conversation_id).await;
    Ok(())
}

pub async fn health(api: Arc<dyn SceneApi>) -> Result<(), Box<dyn Error + Send + Sync>> {
    print_health(api.as_ref()).await;
    Ok(())
}

pub async fn optimize(
    api: Arc<dyn SceneApi>,
    scene_path: &Path
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let raw = tokio::fs::read_to_string(scene_path).await.map_err(|e|
        format!("Failed to read scene file {}: {}", scene_path.display(), e)
    )?;
    let scene: SceneDescription = serde_json::from_str(&raw)?;
    info!("Optimizing scene '{}' ({} objects)", scene.name, scene.objects.len());
    print_suggestions(api.as_ref(), &scene).await;
    Ok(())
}

pub async fn gallery(
    api: Arc<dyn SceneApi>,
    page: usize,
    refresh: Option<Duration>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut gallery = GalleryState::default();
    gallery.check_health(api.as_ref()).await;
    if let Some(delay) = refresh {
        gallery.refresh(delay).await;
    }
    gallery.go_to(page);

    if let Some(status) = gallery.status() {
        println!("{}", status);
    }
    print_notifications(gallery.take_notifications());
    for line in gallery_lines(&gallery) {
        println!("{}", line);
    }
    Ok(())
}

fn gallery_lines(gallery: &GalleryState) -> Vec<String> {
    let cards = gallery.cards();
    if cards.is_empty() {
        return vec!["暂无场景".to_string()];
    }
    let mut lines: Vec<String> = cards
        .iter()
        .map(|c| c.to_string())
        .collect();
    if gallery.shows_pagination() {
        lines.push(
            format!(
                "{}第 {} 页，共 {} 页{}",
                if gallery.can_previous() { "← 上一页  " } else { "" },
                gallery.page(),
                gallery.total_pages(),
                if gallery.can_next() { "  下一页 →" } else { "" }
            )
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::camera::Camera;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse_input("  客厅 "), Input::Message("  客厅 ".into()));
        assert_eq!(parse_input("   "), Input::Blank);
    }

    #[test]
    fn known_commands_are_case_insensitive() {
        assert_eq!(parse_input("/Zoom-In"), Input::Command(SlashCommand::ZoomIn));
        assert_eq!(parse_input(" /quit "), Input::Command(SlashCommand::Quit));
    }

    #[test]
    fn typos_get_a_suggestion() {
        assert_eq!(parse_input("/histroy"), Input::Unknown {
            given: "histroy".into(),
            suggestion: Some("history"),
        });
        match parse_input("/xyz") {
            Input::Unknown { suggestion, .. } => assert_eq!(suggestion, None),
            other => panic!("unexpected input: {:?}", other),
        }
    }

    async fn repl_against_mock() -> ChatRepl {
        let addr = crate::server::spawn("127.0.0.1:0").await.unwrap();
        let config: crate::config::ApiConfig = format!("http://{}", addr).parse().unwrap();
        ChatRepl::new(crate::api::new_client(&config))
    }

    fn named(n: usize) -> Vec<SceneDescription> {
        (0..n)
            .map(|i| SceneDescription { name: format!("scene-{}", i), ..Default::default() })
            .collect()
    }

    #[tokio::test]
    async fn lines_run_in_order_until_quit() {
        let mut repl = repl_against_mock().await;
        repl.run(&b"\xff\xfe\n\xe5\xae\xa2\xe5\x8e\x85 sofa\r\n/quit\nbedroom\n"[..]).await.unwrap();

        // Welcome, the submitted message and its reply; nothing after /quit.
        let messages = repl.session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "客厅 sofa");
        assert_eq!(repl.printed, 3);
        assert!(!repl.viewer.render().placeholder);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_end_the_session() {
        let mut repl = repl_against_mock().await;
        repl.run(&b"\xff\n/zoom-in\n"[..]).await.unwrap();
        assert!(repl.camera.snapshot().distance() < Camera::default().distance());
    }

    #[tokio::test]
    async fn slash_commands_drive_camera_and_reset() {
        let mut repl = repl_against_mock().await;
        assert!(repl.handle_line("/optimize").await);
        assert!(repl.handle_line("/zoom-out").await);
        assert!(repl.camera.snapshot().distance() > Camera::default().distance());
        assert!(repl.handle_line("/reset-view").await);
        assert_eq!(repl.camera.snapshot(), Camera::default());

        assert!(repl.handle_line("客厅 sofa").await);
        assert_eq!(repl.printed, 3);
        assert!(repl.handle_line("/reset").await);
        assert_eq!(repl.session.messages().len(), 1);
        assert_eq!(repl.printed, 1);
        assert!(repl.viewer.render().placeholder);
        assert!(!repl.handle_line("/quit").await);
    }

    #[tokio::test]
    async fn describe_sends_slash_text_as_a_message() {
        let mut repl = repl_against_mock().await;
        repl.describe("/quit").await.unwrap();
        let messages = repl.session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "/quit");

        assert!(repl.describe("   ").await.is_err());
    }

    #[test]
    fn empty_gallery_says_so() {
        assert_eq!(gallery_lines(&GalleryState::new(Vec::new())), vec!["暂无场景"]);
    }

    #[test]
    fn gallery_page_line_names_page_and_total() {
        let mut gallery = GalleryState::new(named(9));
        let lines = gallery_lines(&gallery);
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[8], "第 1 页，共 2 页  下一页 →");

        gallery.next_page();
        let lines = gallery_lines(&gallery);
        assert_eq!(lines, vec!["#9 scene-8 (对象数量: 0)", "← 上一页  第 2 页，共 2 页"]);
    }
}
