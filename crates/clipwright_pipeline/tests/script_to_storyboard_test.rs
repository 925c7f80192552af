//! Tests for the script→storyboard orchestrator and voice analysis.

use async_trait::async_trait;
use clipwright_core::{Locale, StepMetadata, StepOutput};
use clipwright_error::ClipwrightResult;
use clipwright_interface::workflow::ScriptToStoryboardResult;
use clipwright_pipeline::{
    RunStep, ScriptToStoryboardInput, StaticPromptLibrary, run_script_to_storyboard,
    run_voice_analysis, voice_step_metadata,
};

const PLAN_JSON: &str = r#"[
  {
    "clip_id": "clip-1",
    "title": "Harbor arrival",
    "panels": [
      {"description": "Ship emerges from fog"},
      {"description": "Crowd gathers on the pier"}
    ]
  }
]"#;

const CAMERA_JSON: &str = r#"[
  {"panel_index": 1, "camera": "slow push-in, wide shot"},
  {"panel_index": 2, "camera": "handheld close-up"}
]"#;

const ACTING_JSON: &str = r#"[
  {"panel_index": 1, "acting": "Lin Yan scans the dock warily"},
  {"panel_index": 2, "acting": "Old Wei shoulders through the crowd"}
]"#;

const DETAIL_JSON: &str = r#"{"detail": "Lantern light diffuses through sea fog over wet planks."}"#;

const VOICE_JSON: &str = r#"[
  {"speaker": "Lin Yan", "text": "We're late.", "matched_panel": {"storyboard_index": 1, "panel_index": 1}},
  {"speaker": "Old Wei", "text": "The tide kept us honest.", "matched_panel": {"storyboard_index": 1, "panel_index": 2}}
]"#;

struct FnSteps<F>(F);

#[async_trait]
impl<F> RunStep for FnSteps<F>
where
    F: Fn(&StepMetadata, &str, &str) -> ClipwrightResult<String> + Send + Sync,
{
    async fn run_step(
        &self,
        meta: &StepMetadata,
        prompt: &str,
        action: &str,
        _max_output_tokens: u32,
    ) -> ClipwrightResult<StepOutput> {
        (self.0)(meta, prompt, action).map(|text| StepOutput {
            text,
            reasoning: None,
        })
    }
}

fn scripted_ok() -> impl Fn(&StepMetadata, &str, &str) -> ClipwrightResult<String> {
    |_meta, _prompt, action| {
        Ok(match action {
            "plan_storyboards" => PLAN_JSON.to_string(),
            "cinematography" => CAMERA_JSON.to_string(),
            "acting_direction" => ACTING_JSON.to_string(),
            "expand_panel_detail" => DETAIL_JSON.to_string(),
            "extract_voice_lines" => VOICE_JSON.to_string(),
            other => panic!("unexpected action: {}", other),
        })
    }
}

fn input() -> ScriptToStoryboardInput {
    ScriptToStoryboardInput {
        episode_id: 10,
        script_text: "EXT. HARBOR - NIGHT\nLIN YAN: We're late.".to_string(),
        locale: Locale::En,
    }
}

#[tokio::test]
async fn builds_fully_directed_storyboards() {
    let steps = FnSteps(scripted_ok());
    let prompts = StaticPromptLibrary::new();

    let storyboards = run_script_to_storyboard(&steps, &prompts, &input())
        .await
        .expect("construction should succeed");

    assert_eq!(storyboards.len(), 1);
    let storyboard = &storyboards[0];
    assert_eq!(storyboard.storyboard_index, 1);
    assert_eq!(storyboard.panels.len(), 2);

    for (i, panel) in storyboard.panels.iter().enumerate() {
        assert_eq!(panel.panel_index, (i + 1) as i32);
        assert!(panel.camera.is_some(), "camera filled by cinematography step");
        assert!(panel.acting.is_some(), "acting filled by acting step");
        assert!(panel.detail.is_some(), "detail filled by expansion step");
    }
    assert_eq!(
        storyboard.panels[0].camera.as_deref(),
        Some("slow push-in, wide shot")
    );
}

#[tokio::test]
async fn patch_for_missing_panel_is_fatal() {
    let steps = FnSteps(|_meta: &StepMetadata, _prompt: &str, action: &str| match action {
        "plan_storyboards" => Ok(PLAN_JSON.to_string()),
        "cinematography" => Ok(r#"[{"panel_index": 9, "camera": "crane shot"}]"#.to_string()),
        other => panic!("unexpected action: {}", other),
    });
    let prompts = StaticPromptLibrary::new();

    let err = run_script_to_storyboard(&steps, &prompts, &input())
        .await
        .expect_err("patch for a panel that does not exist must fail");
    let parse = err.as_json_parse().expect("distinguished parse failure");
    assert!(parse.message.contains("missing panel 9"));
}

#[tokio::test]
async fn planning_without_panels_is_fatal() {
    let steps = FnSteps(|_meta: &StepMetadata, _prompt: &str, action: &str| match action {
        "plan_storyboards" => {
            Ok(r#"[{"clip_id": "clip-1", "title": "Empty", "panels": []}]"#.to_string())
        }
        other => panic!("unexpected action: {}", other),
    });
    let prompts = StaticPromptLibrary::new();

    let err = run_script_to_storyboard(&steps, &prompts, &input())
        .await
        .expect_err("a storyboard without panels is unusable downstream");
    assert!(err.as_json_parse().is_some());
}

#[tokio::test]
async fn voice_analysis_assigns_positional_line_indexes() {
    let steps = FnSteps(scripted_ok());
    let prompts = StaticPromptLibrary::new();

    let storyboards = run_script_to_storyboard(&steps, &prompts, &input())
        .await
        .unwrap();
    let meta = voice_step_metadata(&storyboards);
    // plan + cinematography + acting + 2 panel details + voice = 6 steps
    assert_eq!(meta.step_total, 6);
    assert_eq!(meta.step_index, 5);

    let lines = run_voice_analysis(
        &steps,
        &prompts,
        Locale::En,
        "EXT. HARBOR - NIGHT",
        &storyboards,
        &meta,
    )
    .await
    .expect("voice analysis should succeed");

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].line_index, 1);
    assert_eq!(lines[1].line_index, 2);
    assert_eq!(lines[0].matched_panel.unwrap().panel_index, 1);
}

#[tokio::test]
async fn result_summary_is_derived_from_final_lists() {
    let steps = FnSteps(scripted_ok());
    let prompts = StaticPromptLibrary::new();

    let storyboards = run_script_to_storyboard(&steps, &prompts, &input())
        .await
        .unwrap();
    let meta = voice_step_metadata(&storyboards);
    let lines = run_voice_analysis(
        &steps,
        &prompts,
        Locale::En,
        "EXT. HARBOR - NIGHT",
        &storyboards,
        &meta,
    )
    .await
    .unwrap();

    let result = ScriptToStoryboardResult::new(storyboards, lines);
    assert_eq!(result.summary.storyboard_count, 1);
    assert_eq!(result.summary.panel_count, 2);
    assert_eq!(result.summary.voice_line_count, 2);
    assert_eq!(result.summary.total_step_count, 6);
}
