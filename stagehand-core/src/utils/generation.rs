//! 代数计数器
//!
//! 每次开始新的异步流程时推进计数并拿到令牌；完成回调只在令牌仍是最新时生效，
//! 过期的回调被丢弃而不是被取消。

/// 不透明的代数令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// 单调递增计数器
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进并返回新令牌（先递增再捕获）
    pub fn advance(&mut self) -> GenerationToken {
        self.current += 1;
        GenerationToken(self.current)
    }

    pub fn current(&self) -> GenerationToken {
        GenerationToken(self.current)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        token.0 == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let mut counter = Generation::new();
        let first = counter.advance();
        let second = counter.advance();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert!(second > first);
    }
}
