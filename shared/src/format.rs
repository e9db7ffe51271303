//! 生命体征和风险分数的显示格式

/// 缺失值显示为 `-`；整数不带小数点
pub fn format_vital(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => {
            let s = format!("{:.2}", v);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    }
}

/// `0.734` → `73.4%`
pub fn format_risk_score(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn format_blood_pressure(systolic: f64, diastolic: f64) -> String {
    format!(
        "{}/{}",
        format_vital(Some(systolic)),
        format_vital(Some(diastolic))
    )
}
