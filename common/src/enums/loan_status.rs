use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 贷款状态枚举
///
/// 流转: Requested → PartiallyFunded → FullyFunded → Disbursing → Active → Completed/Defaulted
/// Completed 和 Defaulted 为终态, 不允许再流出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum LoanStatus {
    /// 已发布, 尚无出资 (0)
    #[strum(to_string = "已发布")]
    Requested = 0,
    /// 部分出资 (1)
    #[strum(to_string = "部分出资")]
    PartiallyFunded = 1,
    /// 出资已满额, 等待放款 (2)
    #[strum(to_string = "满额")]
    FullyFunded = 2,
    /// 放款转账进行中 (3)
    #[strum(to_string = "放款中")]
    Disbursing = 3,
    /// 已放款, 还款期内 (4)
    #[strum(to_string = "还款中")]
    Active = 4,
    /// 全部还清 (5)
    #[strum(to_string = "已结清")]
    Completed = 5,
    /// 违约 (6)
    #[strum(to_string = "违约")]
    Defaulted = 6,
}

impl LoanStatus {
    /// 转换为 i32 值
    pub fn get_code(self) -> i32 {
        self as i32
    }

    /// 从 i32 值转换
    pub fn from_code(value: i32) -> Option<Self> {
        Self::iter().find(|e| e.get_code() == value)
    }

    /// 获取描述
    pub fn description(&self) -> String {
        self.as_ref().to_string()
    }

    /// 是否终态
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Completed | LoanStatus::Defaulted)
    }

    /// 当前状态是否还接受出资
    pub fn accepts_funding(self) -> bool {
        matches!(self, LoanStatus::Requested | LoanStatus::PartiallyFunded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for status in LoanStatus::iter() {
            assert_eq!(LoanStatus::from_code(status.get_code()), Some(status));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(LoanStatus::Completed.is_terminal());
        assert!(LoanStatus::Defaulted.is_terminal());
        assert!(!LoanStatus::Active.is_terminal());
    }

    #[test]
    fn test_funding_gate() {
        assert!(LoanStatus::Requested.accepts_funding());
        assert!(LoanStatus::PartiallyFunded.accepts_funding());
        assert!(!LoanStatus::FullyFunded.accepts_funding());
        assert!(!LoanStatus::Active.accepts_funding());
    }
}
