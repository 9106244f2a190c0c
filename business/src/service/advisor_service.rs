use std::time::Duration;

use common::config::{AdvisorConfig, PlatformConfig};
use common::enums::RiskScore;
use common::models::{AssessReq, AssessmentDto};
use common::{AppError, AppResult};
use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use settlement::amortization::{assess_risk, compute_installment, total_interest};

/// 贷款评估服务
///
/// 评级和定价始终在本地确定性计算, 顾问端点只负责生成评语文本.
/// 端点静态配置; 开启后调用失败直接报错, 不降级为本地文案
pub struct AdvisorService {
    conf: AdvisorConfig,
    platform: PlatformConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct CommentaryReq<'a> {
    principal_sol: String,
    annual_rate_pct: String,
    term_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<&'a str>,
    risk_desc: String,
    monthly_payment_sol: String,
}

#[derive(Debug, Deserialize)]
struct CommentaryResp {
    text: String,
}

impl AdvisorService {
    pub fn new(conf: AdvisorConfig, platform: PlatformConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(conf.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("顾问客户端初始化失败: {}", e)))?;
        Ok(Self {
            conf,
            platform,
            client,
        })
    }

    pub async fn assess(&self, req: &AssessReq) -> AppResult<AssessmentDto> {
        let monthly = compute_installment(req.principal_sol, req.annual_rate_pct, req.term_months)?;
        let interest = total_interest(req.principal_sol, req.annual_rate_pct, req.term_months)?;
        let risk = assess_risk(
            req.principal_sol,
            req.annual_rate_pct,
            req.term_months,
            req.purpose.as_deref(),
            &self.platform,
        );

        let commentary = if self.conf.enabled {
            self.remote_commentary(req, risk, monthly).await?
        } else {
            local_commentary(req, risk)
        };

        Ok(AssessmentDto {
            risk_score: risk.get_code(),
            risk_desc: risk.description(),
            monthly_payment_sol: monthly,
            total_interest_sol: interest,
            commentary,
        })
    }

    async fn remote_commentary(
        &self,
        req: &AssessReq,
        risk: RiskScore,
        monthly: rust_decimal::Decimal,
    ) -> AppResult<String> {
        let body = CommentaryReq {
            principal_sol: req.principal_sol.to_string(),
            annual_rate_pct: req.annual_rate_pct.to_string(),
            term_months: req.term_months,
            purpose: req.purpose.as_deref(),
            risk_desc: risk.description(),
            monthly_payment_sol: monthly.to_string(),
        };

        let mut request = self.client.post(&self.conf.endpoint).json(&body);
        if let Some(key) = &self.conf.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::business(format!("顾问服务调用失败: {}", e)))?;
        if !resp.status().is_success() {
            return Err(AppError::business(format!(
                "顾问服务返回异常状态: {}",
                resp.status()
            )));
        }
        let reply: CommentaryResp = resp
            .json()
            .await
            .map_err(|e| AppError::business(format!("顾问服务响应解析失败: {}", e)))?;
        info!("顾问评语生成完成: risk={}", risk.description());
        Ok(reply.text)
    }
}

/// 顾问未启用时的本地评语, 只陈述计算结果
fn local_commentary(req: &AssessReq, risk: RiskScore) -> String {
    let purpose = req.purpose.as_deref().unwrap_or("未说明用途");
    format!(
        "{} 风险: 本金 {} SOL, 年化 {}%, {} 期, 用途: {}",
        risk.description(),
        req.principal_sol,
        req.annual_rate_pct,
        req.term_months,
        purpose
    )
}
