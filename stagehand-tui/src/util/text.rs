//! 文本辅助：按显示宽度截断、时间戳

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 按显示宽度截断，超出时以 `…` 结尾
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        // 给省略号留一列
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// 活动日志使用的本地时间戳
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_keeps_short_text() {
        assert_eq!(fit_width("OK", 10), "OK");
    }

    #[test]
    fn test_fit_width_truncates_wide_chars() {
        // 每个汉字占两列
        let fitted = fit_width("新手引导教程", 7);
        assert_eq!(fitted, "新手引…");
        assert!(fitted.width() <= 7);
    }

    #[test]
    fn test_fit_width_zero() {
        assert_eq!(fit_width("Gallery", 0), "");
    }
}
