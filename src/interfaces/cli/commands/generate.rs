//! Generate command

use std::time::Duration;

use colored::Colorize;

use crate::client::{DreamClient, DreamSession};
use crate::interfaces::cli::CliError;
use crate::services::{Room, Theme};

/// 生成可能需要几分钟
const GENERATE_TIMEOUT: Duration = Duration::from_secs(600);

pub struct GenerateArgs {
    pub image: String,
    pub theme: String,
    pub room: String,
    pub prompt: Option<String>,
    pub custom_prompt: Option<String>,
    pub scale: Option<f64>,
    pub server: String,
}

/// URL 路径的最后一段作为照片文件名
pub fn photo_name_from_url(image: &str) -> String {
    url::Url::parse(image)
        .ok()
        .and_then(|u| {
            u.path_segments()?
                .next_back()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "room.jpg".to_string())
}

fn build_session(args: &GenerateArgs) -> Result<DreamSession, CliError> {
    let mut session = DreamSession::new();
    session.theme = args
        .theme
        .parse::<Theme>()
        .map_err(|_| CliError::ParseError(format!("Unknown theme: {}", args.theme)))?;
    session.room = args
        .room
        .parse::<Room>()
        .map_err(|_| CliError::ParseError(format!("Unknown room: {}", args.room)))?;
    session.prompt = args.prompt.clone().unwrap_or_default();
    session.custom_prompt = args.custom_prompt.clone().unwrap_or_default();
    if let Some(scale) = args.scale {
        session.scale = scale;
    }
    session.upload(args.image.clone(), photo_name_from_url(&args.image));
    Ok(session)
}

pub async fn generate_room(args: GenerateArgs) -> Result<(), CliError> {
    let mut session = build_session(&args)?;
    let request = session.begin()?;
    let client = DreamClient::new(&args.server, GENERATE_TIMEOUT);

    println!(
        "{} {} {} {}",
        "Generating".yellow(),
        session.theme.to_string().cyan(),
        session.room.to_string().cyan(),
        "(this can take a minute)...".dimmed()
    );

    let result = tokio::task::spawn_blocking(move || client.generate(&request))
        .await
        .map_err(|e| CliError::CommandError(e.to_string()))?;
    session.finish(result);

    if let Some(error) = session.error.take() {
        return Err(CliError::ClientError(error));
    }

    if let Some(image) = &session.generated_image {
        println!("  {} {}", "Generated image:".green(), image.blue());
    }
    if let Some(name) = session.download_name() {
        println!("  {} {}", "Save as:".green(), name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GenerateArgs {
        GenerateArgs {
            image: "https://upcdn.io/abc/raw/uploads/kitchen.png".to_string(),
            theme: "vintage".to_string(),
            room: "bedroom".to_string(),
            prompt: None,
            custom_prompt: None,
            scale: Some(10.0),
            server: "http://127.0.0.1:8080".to_string(),
        }
    }

    #[test]
    fn test_photo_name_from_url() {
        assert_eq!(
            photo_name_from_url("https://upcdn.io/abc/raw/uploads/kitchen.png"),
            "kitchen.png"
        );
        assert_eq!(photo_name_from_url("https://upcdn.io/"), "room.jpg");
        assert_eq!(photo_name_from_url("not a url"), "room.jpg");
    }

    #[test]
    fn test_build_session_parses_styles() {
        let session = build_session(&args()).unwrap();
        assert_eq!(session.theme, Theme::Vintage);
        assert_eq!(session.room, Room::Bedroom);
        assert_eq!(session.scale, 10.0);
        assert_eq!(session.photo_name.as_deref(), Some("kitchen.png"));
        assert!(session.can_generate());
    }

    #[test]
    fn test_build_session_rejects_unknown_room() {
        let bad = GenerateArgs {
            room: "Garage".to_string(),
            ..args()
        };
        assert!(matches!(build_session(&bad), Err(CliError::ParseError(_))));
    }
}
