use common::config::PlatformConfig;
use common::constants::MAX_TERM_MONTHS;
use common::enums::RiskScore;
use common::{AppError, AppResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// 等额本息分期计算与风险评级
///
/// 纯计算, 不做任何 I/O

fn validate_terms(principal: Decimal, annual_rate_pct: Decimal, months: u32) -> AppResult<()> {
    if principal <= Decimal::ZERO {
        return Err(AppError::InvalidTerm(format!("本金必须大于 0: {}", principal)));
    }
    if months == 0 {
        return Err(AppError::InvalidTerm("期数必须大于 0".to_string()));
    }
    if months > MAX_TERM_MONTHS {
        return Err(AppError::InvalidTerm(format!(
            "期数超过上限 {}: {}",
            MAX_TERM_MONTHS, months
        )));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(AppError::InvalidTerm(format!(
            "年利率不能为负: {}",
            annual_rate_pct
        )));
    }
    Ok(())
}

/// 每期应还金额, 等额本息公式 P*r*(1+r)^n / ((1+r)^n - 1)
///
/// r 为月利率, 零利率时退化为 P/n. 结果保留 9 位小数 (1 lamport 精度)
pub fn compute_installment(
    principal: Decimal,
    annual_rate_pct: Decimal,
    months: u32,
) -> AppResult<Decimal> {
    validate_terms(principal, annual_rate_pct, months)?;

    let n = Decimal::from(months);
    if annual_rate_pct.is_zero() {
        return Ok((principal / n).round_dp(9));
    }

    let p = principal
        .to_f64()
        .ok_or_else(|| AppError::InvalidTerm(format!("本金超出可计算范围: {}", principal)))?;
    let rate = annual_rate_pct
        .to_f64()
        .ok_or_else(|| AppError::InvalidTerm(format!("利率超出可计算范围: {}", annual_rate_pct)))?;

    let r = rate / 12.0 / 100.0;
    let factor = (1.0 + r).powi(months as i32);
    let payment = p * r * factor / (factor - 1.0);

    Decimal::from_f64(payment)
        .map(|d| d.round_dp(9))
        .ok_or_else(|| AppError::internal("分期金额计算失败"))
}

/// 全周期总利息 = 每期金额 * 期数 - 本金, 不会为负
pub fn total_interest(
    principal: Decimal,
    annual_rate_pct: Decimal,
    months: u32,
) -> AppResult<Decimal> {
    let installment = compute_installment(principal, annual_rate_pct, months)?;
    let interest = installment * Decimal::from(months) - principal;
    Ok(interest.max(Decimal::ZERO).round_dp(9))
}

/// 确定性风险评级
///
/// 本金超阈值上调一档, 利率超上限再上调一档, 封顶 High.
/// 期数和用途目前不参与评级
pub fn assess_risk(
    principal: Decimal,
    annual_rate_pct: Decimal,
    _months: u32,
    _purpose: Option<&str>,
    conf: &PlatformConfig,
) -> RiskScore {
    let mut score = RiskScore::Low;
    if principal > conf.risk_principal_threshold {
        score = score.raise();
    }
    if annual_rate_pct > conf.risk_rate_ceiling {
        score = score.raise();
    }
    score
}
