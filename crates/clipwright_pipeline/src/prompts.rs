//! Built-in prompt templates with locale selection.

use clipwright_core::Locale;
use clipwright_error::{ClipwrightResult, ConfigError};
use clipwright_interface::PromptLibrary;
use regex::Regex;
use std::collections::HashMap;

/// Prompt identifiers for both workflows.
pub mod prompt_ids {
    /// Character-profile extraction from novel text
    pub const STORY_CHARACTERS: &str = "story.characters";
    /// Location selection from novel text
    pub const STORY_LOCATIONS: &str = "story.locations";
    /// Clip segmentation of novel text
    pub const STORY_CLIPS: &str = "story.clips";
    /// Per-clip screenplay conversion
    pub const STORY_SCREENPLAY: &str = "story.screenplay";
    /// Storyboard planning over the assembled screenplay
    pub const BOARD_PLAN: &str = "board.plan";
    /// Cinematography for one storyboard unit
    pub const BOARD_CINEMATOGRAPHY: &str = "board.cinematography";
    /// Acting direction for one storyboard unit
    pub const BOARD_ACTING: &str = "board.acting";
    /// Detail expansion for one panel
    pub const BOARD_DETAIL: &str = "board.detail";
    /// Voice-line extraction with panel matching
    pub const BOARD_VOICE_LINES: &str = "board.voice_lines";
}

/// Code-resident prompt templates keyed by id and locale.
///
/// # Examples
///
/// ```
/// use clipwright_core::Locale;
/// use clipwright_interface::PromptLibrary;
/// use clipwright_pipeline::{StaticPromptLibrary, prompt_ids};
/// use std::collections::HashMap;
///
/// let library = StaticPromptLibrary::new();
/// let mut vars = HashMap::new();
/// vars.insert("novel_text".to_string(), "Once upon a time...".to_string());
/// let prompt = library
///     .build(prompt_ids::STORY_CHARACTERS, Locale::En, &vars)
///     .unwrap();
/// assert!(prompt.contains("Once upon a time"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticPromptLibrary;

impl StaticPromptLibrary {
    /// Create the built-in library.
    pub fn new() -> Self {
        Self
    }
}

impl PromptLibrary for StaticPromptLibrary {
    fn template(&self, prompt_id: &str, locale: Locale) -> ClipwrightResult<String> {
        template_text(prompt_id, locale)
            .map(str::to_string)
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "no template for prompt '{}' in locale '{}'",
                    prompt_id, locale
                ))
                .into()
            })
    }

    fn build(
        &self,
        prompt_id: &str,
        locale: Locale,
        vars: &HashMap<String, String>,
    ) -> ClipwrightResult<String> {
        let template = self.template(prompt_id, locale)?;
        let placeholder = Regex::new(r"\{\{([a-zA-Z0-9_]+)\}\}")
            .map_err(|e| ConfigError::new(format!("invalid placeholder regex: {}", e)))?;

        let mut result = template.clone();
        for cap in placeholder.captures_iter(&template) {
            let name = &cap[1];
            let value = vars.get(name).ok_or_else(|| {
                ConfigError::new(format!(
                    "placeholder '{}' not provided for prompt '{}'",
                    name, prompt_id
                ))
            })?;
            result = result.replace(&cap[0], value);
        }

        Ok(result)
    }
}

fn template_text(prompt_id: &str, locale: Locale) -> Option<&'static str> {
    use prompt_ids::*;
    match (prompt_id, locale) {
        (STORY_CHARACTERS, Locale::En) => Some(
            "Read the novel text below and extract every significant character.\n\
             Output ONLY a JSON array of objects with keys: name, role, appearance, personality.\n\
             \n\
             Novel text:\n{{novel_text}}",
        ),
        (STORY_CHARACTERS, Locale::Zh) => Some(
            "阅读下面的小说文本，提取所有重要角色。\n\
             只输出 JSON 数组，对象字段为: name, role, appearance, personality。\n\
             \n\
             小说文本:\n{{novel_text}}",
        ),
        (STORY_LOCATIONS, Locale::En) => Some(
            "Read the novel text below and select the locations where scenes take place.\n\
             Output ONLY a JSON array of objects with keys: name, description, mood.\n\
             \n\
             Novel text:\n{{novel_text}}",
        ),
        (STORY_LOCATIONS, Locale::Zh) => Some(
            "阅读下面的小说文本，选出场景发生的地点。\n\
             只输出 JSON 数组，对象字段为: name, description, mood。\n\
             \n\
             小说文本:\n{{novel_text}}",
        ),
        (STORY_CLIPS, Locale::En) => Some(
            "Segment the novel text below into at most {{max_clips}} sequential video clips.\n\
             Each clip covers a contiguous excerpt and should stand alone as a short scene.\n\
             Output ONLY a JSON array of objects with keys: title, summary, source_excerpt.\n\
             \n\
             Novel text:\n{{novel_text}}",
        ),
        (STORY_CLIPS, Locale::Zh) => Some(
            "将下面的小说文本切分为最多 {{max_clips}} 个连续的视频片段。\n\
             每个片段覆盖一段连续原文，可独立成为一个短场景。\n\
             只输出 JSON 数组，对象字段为: title, summary, source_excerpt。\n\
             \n\
             小说文本:\n{{novel_text}}",
        ),
        (STORY_SCREENPLAY, Locale::En) => Some(
            "Convert this clip into screenplay format.\n\
             Clip: {{clip_title}}\n\
             Synopsis: {{clip_summary}}\n\
             Source excerpt:\n{{clip_excerpt}}\n\
             \n\
             Known characters:\n{{characters}}\n\
             \n\
             Output ONLY a JSON object with keys: scene_heading, lines.\n\
             Each line has keys: speaker (null for action lines), text.",
        ),
        (STORY_SCREENPLAY, Locale::Zh) => Some(
            "将该片段改写为剧本格式。\n\
             片段: {{clip_title}}\n\
             梗概: {{clip_summary}}\n\
             原文摘录:\n{{clip_excerpt}}\n\
             \n\
             已知角色:\n{{characters}}\n\
             \n\
             只输出 JSON 对象，字段为: scene_heading, lines。\n\
             每个 line 的字段为: speaker (动作行为 null), text。",
        ),
        (BOARD_PLAN, Locale::En) => Some(
            "Plan storyboards for the screenplay below, one storyboard per scene.\n\
             Output ONLY a JSON array of objects with keys: clip_id, title, panels.\n\
             Each panel has key: description.\n\
             \n\
             Screenplay:\n{{script_text}}",
        ),
        (BOARD_PLAN, Locale::Zh) => Some(
            "为下面的剧本规划分镜，每个场景一个分镜板。\n\
             只输出 JSON 数组，对象字段为: clip_id, title, panels。\n\
             每个 panel 的字段为: description。\n\
             \n\
             剧本:\n{{script_text}}",
        ),
        (BOARD_CINEMATOGRAPHY, Locale::En) => Some(
            "Add camera direction to each panel of storyboard '{{storyboard_title}}'.\n\
             Panels:\n{{panels}}\n\
             \n\
             Output ONLY a JSON array of objects with keys: panel_index, camera.",
        ),
        (BOARD_CINEMATOGRAPHY, Locale::Zh) => Some(
            "为分镜板 '{{storyboard_title}}' 的每个画面补充运镜设计。\n\
             画面:\n{{panels}}\n\
             \n\
             只输出 JSON 数组，对象字段为: panel_index, camera。",
        ),
        (BOARD_ACTING, Locale::En) => Some(
            "Add acting direction to each panel of storyboard '{{storyboard_title}}'.\n\
             Panels:\n{{panels}}\n\
             \n\
             Output ONLY a JSON array of objects with keys: panel_index, acting.",
        ),
        (BOARD_ACTING, Locale::Zh) => Some(
            "为分镜板 '{{storyboard_title}}' 的每个画面补充表演指导。\n\
             画面:\n{{panels}}\n\
             \n\
             只输出 JSON 数组，对象字段为: panel_index, acting。",
        ),
        (BOARD_DETAIL, Locale::En) => Some(
            "Expand this storyboard panel into a detailed visual description\n\
             suitable for image generation.\n\
             Description: {{panel_description}}\n\
             Camera: {{camera}}\n\
             Acting: {{acting}}\n\
             \n\
             Output ONLY a JSON object with key: detail.",
        ),
        (BOARD_DETAIL, Locale::Zh) => Some(
            "将该分镜画面扩写为适合图像生成的详细视觉描述。\n\
             画面描述: {{panel_description}}\n\
             运镜: {{camera}}\n\
             表演: {{acting}}\n\
             \n\
             只输出 JSON 对象，字段为: detail。",
        ),
        (BOARD_VOICE_LINES, Locale::En) => Some(
            "Extract every spoken line from the screenplay below and match each\n\
             to the panel it plays over.\n\
             Panels:\n{{panels}}\n\
             \n\
             Output ONLY a JSON array of objects with keys: speaker, text, matched_panel.\n\
             matched_panel is an object with keys storyboard_index and panel_index,\n\
             or null when no panel fits.\n\
             \n\
             Screenplay:\n{{script_text}}",
        ),
        (BOARD_VOICE_LINES, Locale::Zh) => Some(
            "从下面的剧本中提取所有台词，并为每句台词匹配其所在的分镜画面。\n\
             画面:\n{{panels}}\n\
             \n\
             只输出 JSON 数组，对象字段为: speaker, text, matched_panel。\n\
             matched_panel 是包含 storyboard_index 和 panel_index 的对象，\n\
             无法匹配时为 null。\n\
             \n\
             剧本:\n{{script_text}}",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_prompt_ids_exist_in_both_locales() {
        use prompt_ids::*;
        let library = StaticPromptLibrary::new();
        for id in [
            STORY_CHARACTERS,
            STORY_LOCATIONS,
            STORY_CLIPS,
            STORY_SCREENPLAY,
            BOARD_PLAN,
            BOARD_CINEMATOGRAPHY,
            BOARD_ACTING,
            BOARD_DETAIL,
            BOARD_VOICE_LINES,
        ] {
            assert!(library.template(id, Locale::En).is_ok(), "missing en: {}", id);
            assert!(library.template(id, Locale::Zh).is_ok(), "missing zh: {}", id);
        }
    }

    #[test]
    fn missing_placeholder_is_an_error() {
        let library = StaticPromptLibrary::new();
        let err = library
            .build(prompt_ids::STORY_CHARACTERS, Locale::En, &HashMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("novel_text"));
    }

    #[test]
    fn unknown_prompt_is_an_error() {
        let library = StaticPromptLibrary::new();
        assert!(library.template("story.unknown", Locale::En).is_err());
    }
}
