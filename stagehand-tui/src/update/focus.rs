use stagehand_core::traits::VisualNode;

use crate::message::FocusMessage;
use crate::model::App;

pub fn update(app: &mut App, msg: FocusMessage) {
    match msg {
        FocusMessage::Next => app.focus_next(),
        FocusMessage::Prev => app.focus_prev(),
        FocusMessage::Activate => match app.focused() {
            Some(node) => {
                if !node.click() {
                    app.set_status(format!("'{}' is not interactable", node.name()));
                }
            }
            None => app.set_status("Nothing to press"),
        },
    }
}
