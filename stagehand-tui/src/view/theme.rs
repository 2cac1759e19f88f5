//! 颜色与样式

use ratatui::style::{Color, Modifier, Style};

/// 常用样式
pub struct Styles;

impl Styles {
    /// 页面底色
    pub fn canvas() -> Style {
        Style::default()
            .bg(Color::Rgb(30, 30, 30))
            .fg(Color::Rgb(212, 212, 212))
    }

    /// 页面边框
    pub fn border() -> Style {
        Style::default().fg(Color::Rgb(62, 62, 62))
    }

    /// 弹窗边框
    pub fn dialog_border() -> Style {
        Style::default().fg(Color::Rgb(0, 122, 204))
    }

    /// 弹窗底色
    pub fn dialog() -> Style {
        Style::default()
            .bg(Color::Rgb(37, 37, 38))
            .fg(Color::Rgb(212, 212, 212))
    }

    /// 教程高亮框
    pub fn highlight() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    /// 标题样式
    pub fn title() -> Style {
        Style::default()
            .fg(Color::Rgb(212, 212, 212))
            .add_modifier(Modifier::BOLD)
    }

    /// 正文样式
    pub fn body() -> Style {
        Style::default().fg(Color::Rgb(180, 180, 180))
    }

    /// 图标
    pub fn icon() -> Style {
        Style::default()
            .fg(Color::Rgb(0, 122, 204))
            .add_modifier(Modifier::BOLD)
    }

    /// 普通按钮
    pub fn button() -> Style {
        Style::default()
            .bg(Color::Rgb(62, 62, 62))
            .fg(Color::White)
    }

    /// 焦点按钮
    pub fn button_focused() -> Style {
        Style::default()
            .bg(Color::Rgb(38, 79, 120))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    /// 不可交互的按钮（转场中）
    pub fn button_disabled() -> Style {
        Style::default()
            .bg(Color::Rgb(45, 45, 45))
            .fg(Color::Rgb(128, 128, 128))
    }

    /// 状态栏样式
    pub fn statusbar() -> Style {
        Style::default()
            .bg(Color::Rgb(0, 122, 204))
            .fg(Color::White)
    }

    /// 快捷键提示样式
    pub fn hint_key() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    /// 快捷键说明样式
    pub fn hint_desc() -> Style {
        Style::default().fg(Color::Rgb(220, 220, 220))
    }

    /// 活动日志
    pub fn activity() -> Style {
        Style::default().fg(Color::Rgb(150, 150, 150))
    }
}
