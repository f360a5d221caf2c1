use log::{ info, warn };
use once_cell::sync::Lazy;
use serde_json::json;
use std::fmt;
use std::time::Duration;

use crate::api::SceneApi;
use crate::models::{ Notification, SceneDescription };

pub const PAGE_SIZE: usize = 8;
pub const HEALTHY_STATUS: &str = "healthy";

static SEED_SCENES: Lazy<Vec<SceneDescription>> = Lazy::new(|| {
    [
        ("现代简约客厅", 3, "ambient"),
        ("日式卧室", 2, "point"),
        ("北欧风书房", 4, "directional"),
        ("工业风厨房", 5, "spot"),
    ]
        .iter()
        .map(|(name, count, light)| {
            let objects = vec![json!({}); *count];
            serde_json
                ::from_value(
                    json!({
                    "name": name,
                    "objects": objects,
                    "lighting": { "type": light },
                    "camera": { "position": [0, 0, 5] },
                })
                )
                .unwrap_or_default()
        })
        .collect()
});

pub fn seed_scenes() -> Vec<SceneDescription> {
    SEED_SCENES.clone()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemStatus {
    Healthy,
    /// Service answered but reported something other than healthy.
    Degraded(String),
    Offline,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemStatus::Healthy => write!(f, "系统状态: 正常"),
            SystemStatus::Degraded(_) | SystemStatus::Offline => write!(f, "系统状态: 异常"),
        }
    }
}

/// Summary shown for one scene in the gallery grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCard {
    /// 1-based position across all pages.
    pub number: usize,
    pub name: String,
    pub object_count: usize,
}

impl fmt::Display for SceneCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} (对象数量: {})", self.number, self.name, self.object_count)
    }
}

#[derive(Debug, Clone)]
pub struct GalleryState {
    scenes: Vec<SceneDescription>,
    page: usize,
    loading: bool,
    status: Option<SystemStatus>,
    notifications: Vec<Notification>,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self::new(seed_scenes())
    }
}

impl GalleryState {
    pub fn new(scenes: Vec<SceneDescription>) -> Self {
        Self {
            scenes,
            page: 1,
            loading: false,
            status: None,
            notifications: Vec::new(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.scenes.len().div_ceil(PAGE_SIZE)
    }

    pub fn start_index(&self) -> usize {
        (self.page - 1) * PAGE_SIZE
    }

    pub fn visible(&self) -> &[SceneDescription] {
        let start = self.start_index().min(self.scenes.len());
        let end = (start + PAGE_SIZE).min(self.scenes.len());
        &self.scenes[start..end]
    }

    pub fn cards(&self) -> Vec<SceneCard> {
        let start = self.start_index();
        self.visible()
            .iter()
            .enumerate()
            .map(|(i, scene)| SceneCard {
                number: start + i + 1,
                name: scene.name.clone(),
                object_count: scene.objects.len(),
            })
            .collect()
    }

    pub fn can_previous(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Pagination controls are hidden for a single page.
    pub fn shows_pagination(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn previous_page(&mut self) {
        if self.can_previous() {
            self.page -= 1;
        }
    }

    pub fn next_page(&mut self) {
        if self.can_next() {
            self.page += 1;
        }
    }

    /// Steps toward `page` one control press at a time, stopping at the bounds.
    pub fn go_to(&mut self, page: usize) {
        while self.page < page && self.can_next() {
            self.next_page();
        }
        while self.page > page && self.can_previous() {
            self.previous_page();
        }
    }

    pub fn status(&self) -> Option<&SystemStatus> {
        self.status.as_ref()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Probes the service once; failures only degrade the status indicator.
    pub async fn check_health(&mut self, api: &dyn SceneApi) {
        let envelope = api.get_system_health().await;
        let status = if !envelope.is_success() {
            warn!("Health check failed: {}", envelope.message);
            SystemStatus::Offline
        } else {
            match envelope.into_data() {
                Some(health) if health.status == HEALTHY_STATUS => SystemStatus::Healthy,
                Some(health) => SystemStatus::Degraded(health.status),
                None => SystemStatus::Offline,
            }
        };
        info!("System status: {:?}", status);
        self.status = Some(status);
    }

    /// There is no listing endpoint yet, so a refresh only waits and confirms.
    pub async fn refresh(&mut self, delay: Duration) {
        if self.loading {
            return;
        }
        self.loading = true;
        tokio::time::sleep(delay).await;
        self.loading = false;
        self.notifications.push(Notification::success("更新成功", "场景库已更新"));
    }
}
