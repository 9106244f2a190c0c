use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 还款分期状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum InstallmentStatus {
    /// 待还款 (0)
    #[strum(to_string = "待还款")]
    Pending = 0,
    /// 已还款 (1)
    #[strum(to_string = "已还款")]
    Paid = 1,
    /// 已逾期, 仍可催收 (2)
    #[strum(to_string = "逾期")]
    Late = 2,
    /// 坏账 (3)
    #[strum(to_string = "坏账")]
    Missed = 3,
}

impl InstallmentStatus {
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

    /// 是否仍可被一笔还款核销 (逾期分期保持可收)
    pub fn is_payable(self) -> bool {
        matches!(self, InstallmentStatus::Pending | InstallmentStatus::Late)
    }
}
