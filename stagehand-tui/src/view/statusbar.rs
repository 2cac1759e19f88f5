//! 状态栏

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::model::App;
use crate::view::theme::Styles;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let backend = &app.backend;
    let separator = || Span::styled(" │ ", Style::default().fg(Color::DarkGray));

    // 导航路径
    let mut spans = vec![Span::raw(format!(" {}", backend.breadcrumb().join(" › ")))];

    if let Some(step) = backend.tour_step() {
        spans.push(separator());
        spans.push(Span::raw(format!("tour: {step}")));
    }
    let queued = backend.pending_modals();
    if queued > 0 {
        spans.push(separator());
        spans.push(Span::raw(format!("queued: {queued}")));
    }

    // 状态消息优先于快捷键提示
    spans.push(separator());
    if let Some(ref msg) = app.status_message {
        spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Yellow)));
    } else {
        for (i, (key, desc)) in hints(app).iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, Styles::hint_key()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(*desc, Styles::hint_desc()));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Styles::statusbar());
    frame.render_widget(paragraph, area);
}

fn hints(app: &App) -> Vec<(&'static str, &'static str)> {
    if app.backend.is_modal_showing() {
        return vec![("Tab", "Focus"), ("Enter", "Press"), ("Esc", "Dismiss")];
    }
    vec![
        ("Tab", "Focus"),
        ("Enter", "Press"),
        ("Esc", "Back"),
        ("m", "Tips"),
        ("w", "Wizard"),
        ("t", "Tour"),
        ("q", "Quit"),
    ]
}
