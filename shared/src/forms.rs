//! 表单输入解析
//!
//! 只校验必填和数值格式，不做医学范围校验。

use crate::protocol::{LoginRequest, RegisterRequest};
use crate::{NewMeasurement, NewPatient, PatientId};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

impl FormError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn required(field: &'static str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FormError {}

fn required(value: &str, field: &'static str, label: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::required(field, label));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_number(value: &str, field: &'static str, label: &str) -> Result<f64, FormError> {
    let raw = required(value, field, label)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::new(field, format!("{} must be a number", label)))
}

fn parse_optional_number(value: &str, field: &'static str, label: &str) -> Result<Option<f64>, FormError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_number(value, field, label).map(Some)
}

// =========================================================
// Auth forms
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_request(&self) -> Result<LoginRequest, FormError> {
        let username = required(&self.username, "username", "Username")?;
        // 密码不做 trim
        if self.password.is_empty() {
            return Err(FormError::required("password", "Password"));
        }
        Ok(LoginRequest {
            username,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, FormError> {
        let username = required(&self.username, "username", "Username")?;
        let email = required(&self.email, "email", "Email")?;
        if self.password.is_empty() {
            return Err(FormError::required("password", "Password"));
        }
        if self.password2.is_empty() {
            return Err(FormError::required("password2", "Password confirmation"));
        }
        if self.password != self.password2 {
            return Err(FormError::new("password2", "Passwords do not match"));
        }
        Ok(RegisterRequest {
            username,
            email,
            password: self.password.clone(),
            password2: self.password2.clone(),
        })
    }
}

// =========================================================
// Patient form
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDraft {
    pub full_name: String,
    /// `YYYY-MM-DD`，来自 `<input type="date">`
    pub dob: String,
}

impl PatientDraft {
    pub fn to_new_patient(&self) -> Result<NewPatient, FormError> {
        let full_name = required(&self.full_name, "full_name", "Full name")?;
        let dob = match optional(&self.dob) {
            None => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| FormError::new("dob", "Date of birth must be YYYY-MM-DD"))?,
            ),
        };
        Ok(NewPatient { full_name, dob })
    }
}

// =========================================================
// Measurement form
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementDraft {
    /// 在全局测量页需要选择病人；病人详情页直接指定
    pub patient: String,
    pub heart_rate: String,
    pub spo2: String,
    pub systolic: String,
    pub diastolic: String,
    pub respiratory_rate: String,
    pub temperature: String,
    pub notes: String,
}

impl MeasurementDraft {
    pub fn to_new_measurement(&self) -> Result<NewMeasurement, FormError> {
        Ok(NewMeasurement {
            heart_rate: parse_number(&self.heart_rate, "heart_rate", "Heart rate")?,
            spo2: parse_number(&self.spo2, "spo2", "SpO2")?,
            systolic: parse_number(&self.systolic, "systolic", "Systolic pressure")?,
            diastolic: parse_number(&self.diastolic, "diastolic", "Diastolic pressure")?,
            respiratory_rate: parse_optional_number(
                &self.respiratory_rate,
                "respiratory_rate",
                "Respiratory rate",
            )?,
            temperature: parse_optional_number(&self.temperature, "temperature", "Temperature")?,
            notes: optional(&self.notes),
        })
    }

    pub fn patient_id(&self) -> Result<PatientId, FormError> {
        let raw = self.patient.trim();
        if raw.is_empty() {
            return Err(FormError::new("patient", "Please select a patient"));
        }
        raw.parse::<PatientId>()
            .map_err(|_| FormError::new("patient", "Please select a patient"))
    }
}
