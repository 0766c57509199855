//! 单次会话的瞬时状态
//!
//! 同一时刻最多一个生成请求在进行中。

use super::ClientError;
use crate::services::{GenerateRequest, GuidanceScale, Room, Theme};

/// 客户端默认的 guidance scale
pub const DEFAULT_CLIENT_SCALE: f64 = 7.0;

#[derive(Debug, Clone)]
pub struct DreamSession {
    pub original_photo: Option<String>,
    pub photo_name: Option<String>,
    pub generated_image: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub side_by_side: bool,
    pub theme: Theme,
    pub room: Room,
    /// Extra requirements for template mode
    pub prompt: String,
    pub custom_prompt: String,
    pub scale: f64,
}

impl Default for DreamSession {
    fn default() -> Self {
        Self {
            original_photo: None,
            photo_name: None,
            generated_image: None,
            loading: false,
            error: None,
            side_by_side: false,
            theme: Theme::default(),
            room: Room::default(),
            prompt: String::new(),
            custom_prompt: String::new(),
            scale: DEFAULT_CLIENT_SCALE,
        }
    }
}

impl DreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新照片上传完成：清掉上一次的结果和错误
    pub fn upload(&mut self, url: impl Into<String>, name: impl Into<String>) {
        self.original_photo = Some(url.into());
        self.photo_name = Some(name.into());
        self.generated_image = None;
        self.error = None;
        self.loading = false;
    }

    pub fn can_generate(&self) -> bool {
        self.original_photo.is_some() && !self.loading
    }

    /// 开始生成，返回要提交的请求体
    pub fn begin(&mut self) -> Result<GenerateRequest, ClientError> {
        if self.loading {
            return Err(ClientError::NotReady(
                "A generation is already in progress".to_string(),
            ));
        }
        let Some(photo) = self.original_photo.clone() else {
            return Err(ClientError::NotReady("Upload a photo first".to_string()));
        };

        self.loading = true;
        self.error = None;
        self.generated_image = None;

        let custom = self.custom_prompt.trim();
        Ok(GenerateRequest {
            image_url: Some(photo),
            theme: Some(self.theme.to_string()),
            room: Some(self.room.to_string()),
            prompt: (!self.prompt.trim().is_empty()).then(|| self.prompt.clone()),
            custom_prompt: (!custom.is_empty()).then(|| custom.to_string()),
            scale: Some(GuidanceScale::Number(self.scale)),
            ..Default::default()
        })
    }

    /// 记录生成结果，结束 loading
    pub fn finish(&mut self, result: Result<String, ClientError>) {
        self.loading = false;
        match result {
            Ok(url) => {
                self.generated_image = Some(url);
                self.error = None;
            }
            Err(e) => {
                self.generated_image = None;
                self.error = Some(e.user_message());
            }
        }
    }

    pub fn toggle_side_by_side(&mut self) {
        self.side_by_side = !self.side_by_side;
    }

    /// 回到初始的上传状态，保留风格选择
    pub fn reset(&mut self) {
        self.original_photo = None;
        self.photo_name = None;
        self.generated_image = None;
        self.error = None;
        self.loading = false;
    }

    /// 下载生成图片时使用的文件名
    pub fn download_name(&self) -> Option<String> {
        self.generated_image.as_ref()?;
        self.photo_name.as_deref().map(append_new_to_name)
    }
}

/// `room.jpg` → `room-new.jpg`；没有扩展名时直接追加
pub fn append_new_to_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-new.{}", stem, ext),
        _ => format!("{}-new", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_new_to_name() {
        assert_eq!(append_new_to_name("room.jpg"), "room-new.jpg");
        assert_eq!(append_new_to_name("my.room.png"), "my.room-new.png");
        assert_eq!(append_new_to_name("photo"), "photo-new");
        assert_eq!(append_new_to_name(".hidden"), ".hidden-new");
    }

    #[test]
    fn test_cannot_generate_without_photo() {
        let mut session = DreamSession::new();
        assert!(!session.can_generate());
        assert!(matches!(session.begin(), Err(ClientError::NotReady(_))));
    }

    #[test]
    fn test_single_generation_in_flight() {
        let mut session = DreamSession::new();
        session.upload("https://upcdn.io/room.jpg", "room.jpg");
        assert!(session.can_generate());

        let request = session.begin().unwrap();
        assert_eq!(request.image_url.as_deref(), Some("https://upcdn.io/room.jpg"));
        assert_eq!(request.room.as_deref(), Some("Living Room"));
        assert!(request.custom_prompt.is_none());
        assert!(!session.can_generate());
        assert!(session.begin().is_err());

        session.finish(Ok("https://r8.im/out.png".to_string()));
        assert!(session.can_generate());
        assert_eq!(session.download_name().as_deref(), Some("room-new.jpg"));
    }

    #[test]
    fn test_failure_sets_error_and_upload_clears_result() {
        let mut session = DreamSession::new();
        session.upload("https://upcdn.io/a.jpg", "a.jpg");
        session.begin().unwrap();
        session.finish(Err(ClientError::UnexpectedResponse));
        assert!(!session.loading);
        assert!(session.error.as_deref().unwrap().starts_with("Unexpected"));
        assert!(session.download_name().is_none());

        session.begin().unwrap();
        session.finish(Ok("https://r8.im/a.png".to_string()));
        session.upload("https://upcdn.io/b.jpg", "b.jpg");
        assert!(session.generated_image.is_none());
        assert!(session.error.is_none());
    }

    #[test]
    fn test_reset_keeps_style_choices() {
        let mut session = DreamSession::new();
        session.theme = Theme::Tropical;
        session.upload("https://upcdn.io/a.jpg", "a.jpg");
        session.toggle_side_by_side();
        session.reset();
        assert!(session.original_photo.is_none());
        assert_eq!(session.theme, Theme::Tropical);
    }
}
