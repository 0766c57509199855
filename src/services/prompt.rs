//! Prompt construction
//!
//! Two modes:
//! - custom: the user's own prompt wrapped in the layout constraints
//! - template: theme + room (+ architecture, palette, extra requirements)

use crate::config::GenerationConfig;

use super::generation::GenerateRequest;

/// Layout constraints appended to every prompt.
pub const BASE_CONSTRAINTS: &str = "Create a single, cohesive room design. Keep the original wall and window layout exactly as is - no new windows in solid walls. Ignore existing furniture, decorations and materials in the room - focus only on the new design. Generate one complete, unified image.";

const CUSTOM_SUFFIX: &str = "Design a complete room as one unified space, maintaining the original wall structure while being creative with furniture and decor.";

const TEMPLATE_SUFFIX: &str = "Create one harmonious space that transforms the interior while preserving the original architecture.";

/// Placeholder value clients send for "no selection"
const NONE_OPTION: &str = "None";

#[derive(Debug, Clone, PartialEq)]
pub struct PromptPlan {
    pub prompt: String,
    pub strength: f64,
    pub guidance_scale: f64,
    pub custom: bool,
}

pub fn build_prompt(request: &GenerateRequest, settings: &GenerationConfig) -> PromptPlan {
    let guidance_scale = request
        .guidance_scale()
        .unwrap_or(settings.default_guidance_scale);

    if let Some(custom) = non_blank(request.custom_prompt.as_deref()) {
        return PromptPlan {
            prompt: format!("{}. {} {}", custom, BASE_CONSTRAINTS, CUSTOM_SUFFIX),
            strength: settings.custom_strength,
            guidance_scale,
            custom: true,
        };
    }

    let theme = request.theme.as_deref().unwrap_or_default().to_lowercase();
    let room = request.room.as_deref().unwrap_or_default().to_lowercase();
    let mut design = format!("Create a cohesive {} style {}", theme, room);

    if let Some(architecture) = selected(request.architecture.as_deref()) {
        design.push_str(&format!(
            " with {} architectural details",
            architecture.to_lowercase()
        ));
    }

    if let Some(palette) = selected(request.color_palette.as_deref()) {
        design.push_str(&format!(" using {} color scheme", palette.to_lowercase()));
    }

    if let Some(extra) = non_blank(request.prompt.as_deref()) {
        design.push_str(&format!(". Additional requirements: {}", extra));
    }

    PromptPlan {
        prompt: format!("{}. {} {}", design, BASE_CONSTRAINTS, TEMPLATE_SUFFIX),
        strength: settings.template_strength,
        guidance_scale,
        custom: false,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn selected(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != NONE_OPTION)
}
