use stagehand_core::types::TutorialEvent;

/// 教程事件的活动日志文字
pub fn describe(event: &TutorialEvent) -> String {
    match event {
        TutorialEvent::Started {
            tutorial_id,
            step_id,
        } => format!("Tour '{tutorial_id}' started at '{step_id}'"),
        TutorialEvent::StepShown { step_id } => format!("Step '{step_id}' shown"),
        TutorialEvent::StepSkipped { step_id } => {
            format!("Step '{step_id}' skipped: anchor not on screen")
        }
        TutorialEvent::StepCompleted { step_id } => format!("Step '{step_id}' completed"),
        TutorialEvent::Ended { completed: true } => "Tour completed".to_string(),
        TutorialEvent::Ended { completed: false } => "Tour stopped".to_string(),
    }
}
