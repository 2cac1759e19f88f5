//! 演示页面

/// 演示页面，每个页面对应一个模板和一个视图控制器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Gallery,
    Settings,
}

impl Screen {
    pub const ALL: [Self; 3] = [Self::Home, Self::Gallery, Self::Settings];

    /// 模板 id
    pub fn template_id(self) -> &'static str {
        match self {
            Self::Home => "screen.home",
            Self::Gallery => "screen.gallery",
            Self::Settings => "screen.settings",
        }
    }

    /// 视图控制器名称
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Gallery => "Gallery",
            Self::Settings => "Settings",
        }
    }
}
