use tokio::sync::mpsc;

/// 贷款生命周期事件
///
/// 出资归集器满额时发出, 由状态机消费触发放款
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanEvent {
    FullyFunded { loan_id: i64 },
}

pub type LoanEventSender = mpsc::UnboundedSender<LoanEvent>;
pub type LoanEventReceiver = mpsc::UnboundedReceiver<LoanEvent>;

pub fn loan_event_channel() -> (LoanEventSender, LoanEventReceiver) {
    mpsc::unbounded_channel()
}
