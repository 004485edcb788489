// ==========================================
// 教务排课系统 - API层输入校验
// ==========================================
// 职责: 表单输入的通用校验与规整
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use chrono::NaiveTime;

/// 校验时间窗: 结束时间必须严格晚于开始时间
pub fn validate_time_window(start_time: NaiveTime, end_time: NaiveTime) -> ApiResult<()> {
    if end_time <= start_time {
        return Err(ApiError::InvalidInput(format!(
            "结束时间必须晚于开始时间: start={}, end={}",
            start_time.format("%H:%M"),
            end_time.format("%H:%M")
        )));
    }
    Ok(())
}

/// 规整可选文本字段: 去除首尾空白，空白串视为未填写
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 校验必填文本字段非空白
pub fn validate_required_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("字段{}不能为空", field)));
    }
    Ok(())
}
