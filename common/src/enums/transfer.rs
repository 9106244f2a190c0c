use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 转账方向枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum TransferDirection {
    /// 放款: 托管账户 → 借款人 (1)
    #[strum(to_string = "放款")]
    Disbursement = 1,
    /// 还款: 借款人 → 托管账户 (2)
    #[strum(to_string = "还款")]
    Repayment = 2,
    /// 测试网领水 (3)
    #[strum(to_string = "测试网领水")]
    TestFunding = 3,
}

impl TransferDirection {
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
}

/// 转账结果枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum TransferOutcome {
    /// 已提交, 等待确认 (0)
    #[strum(to_string = "待确认")]
    Pending = 0,
    /// 链上已确认 (1)
    #[strum(to_string = "已确认")]
    Confirmed = 1,
    /// 失败 (2)
    #[strum(to_string = "失败")]
    Failed = 2,
    /// 模拟成交, 未上链 (3)
    #[strum(to_string = "模拟")]
    Simulated = 3,
}

impl TransferOutcome {
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

    /// 幂等键命中该结果时直接复用原记录, 不再重新提交
    pub fn blocks_resubmission(self) -> bool {
        matches!(
            self,
            TransferOutcome::Pending | TransferOutcome::Confirmed | TransferOutcome::Simulated
        )
    }

    /// 是否视为资金已到位 (用于核销分期/激活贷款)
    pub fn is_settled(self) -> bool {
        matches!(self, TransferOutcome::Confirmed | TransferOutcome::Simulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resubmission_gate() {
        assert!(TransferOutcome::Pending.blocks_resubmission());
        assert!(TransferOutcome::Confirmed.blocks_resubmission());
        assert!(TransferOutcome::Simulated.blocks_resubmission());
        assert!(!TransferOutcome::Failed.blocks_resubmission());
    }
}
