//! 教程、向导和提示弹窗的内容

use std::time::Duration;

use stagehand_core::types::{ButtonSpec, ModalRequest, PlacementMode, TutorialStep, Vec2};

use crate::model::Screen;

/// 教程 id（进度存储的键前缀）
pub const TOUR_ID: &str = "welcome-tour";

/// 锚点：页面、按钮节点名、锚点 id
pub const ANCHORS: [(Screen, &str, &str); 3] = [
    (Screen::Home, "TipsButton", "home.tips"),
    (Screen::Home, "GalleryButton", "home.gallery"),
    (Screen::Gallery, "WizardButton", "gallery.wizard"),
];

/// 欢迎教程
///
/// 第二步要求点击被高亮的按钮本身；第三步等页面滑入后再显示。
pub fn tour_steps(navigation_duration: Duration) -> Vec<TutorialStep> {
    vec![
        TutorialStep::new(
            "tips",
            "home.tips",
            ModalRequest::new("Tips", "This button opens a tip dialog.")
                .with_confirm(ButtonSpec::labeled("Next"))
                .with_close(ButtonSpec::labeled("Skip"))
                .with_background(false, false),
        ),
        TutorialStep::new(
            "gallery",
            "home.gallery",
            ModalRequest::new("Gallery", "Press the highlighted button.")
                .with_confirm(ButtonSpec::hidden())
                .with_close(ButtonSpec::labeled("Skip"))
                .with_background(false, false),
        )
        .dismiss_on_anchor_action(),
        TutorialStep::new(
            "wizard",
            "gallery.wizard",
            ModalRequest::new("Wizards", "Run a three-step wizard from here.")
                .with_confirm(ButtonSpec::labeled("Done"))
                .with_close(ButtonSpec::hidden())
                .with_background(false, false),
        )
        .with_delay(navigation_duration * 2),
    ]
}

/// 提示弹窗（点击背景可关闭）
pub fn tips() -> ModalRequest {
    ModalRequest::new(
        "Tips",
        "Dialogs queue up in order. Esc dismisses the one on screen.",
    )
    .with_icon("i")
    .with_close(ButtonSpec::hidden())
    .with_background(true, true)
}

/// 三步向导
pub fn wizard() -> Vec<ModalRequest> {
    vec![
        ModalRequest::new("Wizard 1/3", "Pick a name for the project.")
            .with_confirm(ButtonSpec::labeled("Next"))
            .with_close(ButtonSpec::labeled("Cancel")),
        ModalRequest::new("Wizard 2/3", "Choose where it lives.")
            .with_confirm(ButtonSpec::labeled("Next"))
            .with_close(ButtonSpec::labeled("Back"))
            .with_placement(PlacementMode::Normalized {
                at: Vec2::new(0.5, 0.4),
            }),
        ModalRequest::new("Wizard 3/3", "All set. Create it?")
            .with_confirm(ButtonSpec::labeled("Create"))
            .with_close(ButtonSpec::labeled("Back")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tour_anchors_are_declared() {
        for step in tour_steps(Duration::from_millis(250)) {
            assert!(
                ANCHORS.iter().any(|(_, _, id)| *id == step.anchor_id),
                "step '{}' has no anchor",
                step.step_id
            );
        }
    }

    #[test]
    fn test_anchor_action_step_hides_confirm() {
        let steps = tour_steps(Duration::ZERO);
        let gallery = steps.iter().find(|s| s.step_id == "gallery").unwrap();
        assert!(gallery.dismiss_on_anchor_action);
        assert!(!gallery.modal.confirm.visible);
    }
}
