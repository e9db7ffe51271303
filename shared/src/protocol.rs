use crate::{
    MeasurementId, NewMeasurement, NewPatient, Patient, PatientId, PatientPatch, Prediction,
    RefreshedToken, TokenPair, User,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to the configured API base (e.g. `http://localhost:8000/api`).
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the bearer credential is attached (and refreshed on 401).
    const AUTHENTICATED: bool = true;

    /// The URL path, including any path parameters.
    fn path(&self) -> String;

    /// JSON body, if any.
    fn body(&self) -> Option<Value> {
        None
    }
}

fn to_body<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = TokenPair;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/auth/login/".to_string()
    }

    fn body(&self) -> Option<Value> {
        to_body(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl ApiRequest for RegisterRequest {
    type Response = TokenPair;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/auth/register/".to_string()
    }

    fn body(&self) -> Option<Value> {
        to_body(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

impl ApiRequest for RefreshRequest {
    type Response = RefreshedToken;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/auth/token/refresh/".to_string()
    }

    fn body(&self) -> Option<Value> {
        to_body(self)
    }
}

/// Current user profile
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileRequest;

impl ApiRequest for ProfileRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/auth/me/".to_string()
    }
}

// =========================================================
// Patients
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ListPatients;

impl ApiRequest for ListPatients {
    type Response = Vec<Patient>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/health/patients/".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct CreatePatient(pub NewPatient);

impl ApiRequest for CreatePatient {
    type Response = Patient;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/health/patients/".to_string()
    }

    fn body(&self) -> Option<Value> {
        to_body(&self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetPatient {
    pub id: PatientId,
}

impl ApiRequest for GetPatient {
    type Response = Patient;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/health/patients/{}/", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct UpdatePatient {
    pub id: PatientId,
    pub patch: PatientPatch,
}

impl ApiRequest for UpdatePatient {
    type Response = Patient;
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("/health/patients/{}/", self.id)
    }

    fn body(&self) -> Option<Value> {
        to_body(&self.patch)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeletePatient {
    pub id: PatientId,
}

impl ApiRequest for DeletePatient {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/health/patients/{}/", self.id)
    }
}

// =========================================================
// Measurements & Predictions
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct ListMeasurements {
    pub patient: PatientId,
}

impl ApiRequest for ListMeasurements {
    type Response = Vec<crate::Measurement>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/health/patients/{}/measurements/", self.patient)
    }
}

#[derive(Debug, Clone)]
pub struct CreateMeasurement {
    pub patient: PatientId,
    pub data: NewMeasurement,
}

impl ApiRequest for CreateMeasurement {
    type Response = crate::Measurement;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/health/patients/{}/measurements/", self.patient)
    }

    fn body(&self) -> Option<Value> {
        to_body(&self.data)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetMeasurement {
    pub id: MeasurementId,
}

impl ApiRequest for GetMeasurement {
    type Response = crate::Measurement;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/health/measurements/{}/", self.id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteMeasurement {
    pub id: MeasurementId,
}

impl ApiRequest for DeleteMeasurement {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/health/measurements/{}/", self.id)
    }
}

/// Prediction attached to a single measurement
#[derive(Debug, Clone, Copy)]
pub struct GetPrediction {
    pub measurement: MeasurementId,
}

impl ApiRequest for GetPrediction {
    type Response = Prediction;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/health/measurements/{}/prediction/", self.measurement)
    }
}
