use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 风险评级枚举
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter, AsRefStr,
)]
pub enum RiskScore {
    /// 低风险 (1)
    #[strum(to_string = "低风险")]
    Low = 1,
    /// 中风险 (2)
    #[strum(to_string = "中风险")]
    Medium = 2,
    /// 高风险 (3)
    #[strum(to_string = "高风险")]
    High = 3,
}

impl RiskScore {
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

    /// 上调一档, 封顶 High
    pub fn raise(self) -> Self {
        match self {
            RiskScore::Low => RiskScore::Medium,
            RiskScore::Medium | RiskScore::High => RiskScore::High,
        }
    }
}
