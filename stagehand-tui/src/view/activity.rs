//! 活动日志：最近的教程事件与弹窗结果

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::model::App;
use crate::util::fit_width;
use crate::view::theme::Styles;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let width = usize::from(area.width.saturating_sub(2));
    let lines: Vec<Line> = app
        .activity
        .iter()
        .map(|entry| Line::styled(fit_width(entry, width), Styles::activity()))
        .collect();

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Styles::border())
        .title(" Activity ")
        .title_style(Styles::title());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
