use crate::{CreatePatientRequest, LoginRequest, LoginResponse, Patient, UpdatePatientRequest};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// 该方法是否携带请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// 路径与方法必须与后端保持兼容，不可变动。
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (or prefix, for requests addressing a single resource).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// 实际请求路径。默认即 `PATH`；携带资源 id 的请求覆盖此方法。
    fn path(&self) -> String {
        Self::PATH.to_string()
    }
}

// =========================================================
// Request Definitions
// =========================================================

/// Authenticate with email + password.
// LoginRequest is defined in lib.rs
impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Check validity of the current bearer token (2xx = valid).
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokenRequest;

impl ApiRequest for ValidateTokenRequest {
    type Response = ();
    const PATH: &'static str = "/auth/validate";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// List the whole patient collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListPatientsRequest;

impl ApiRequest for ListPatientsRequest {
    type Response = Vec<Patient>;
    const PATH: &'static str = "/api/patients";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Create a patient (server assigns the id).
// CreatePatientRequest is defined in lib.rs
impl ApiRequest for CreatePatientRequest {
    type Response = Patient;
    const PATH: &'static str = "/api/patients";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Update one patient. The id travels in the path, never in the body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UpdatePatientCommand {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub patient: UpdatePatientRequest,
}

impl ApiRequest for UpdatePatientCommand {
    type Response = Patient;
    const PATH: &'static str = "/api/patients";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.id)
    }
}

/// Remove one patient. Empty response on success.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeletePatientRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeletePatientRequest {
    type Response = ();
    const PATH: &'static str = "/api/patients";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", Self::PATH, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn endpoint_table_is_preserved() {
        // 与后端契约一一对应，任何改动都会破坏兼容性
        assert_eq!(LoginRequest::PATH, "/auth/login");
        assert_eq!(LoginRequest::METHOD, HttpMethod::Post);
        assert_eq!(ValidateTokenRequest::PATH, "/auth/validate");
        assert_eq!(ValidateTokenRequest::METHOD, HttpMethod::Get);
        assert_eq!(ListPatientsRequest::PATH, "/api/patients");
        assert_eq!(ListPatientsRequest::METHOD, HttpMethod::Get);
        assert_eq!(CreatePatientRequest::METHOD, HttpMethod::Post);
        assert_eq!(UpdatePatientCommand::METHOD, HttpMethod::Put);
        assert_eq!(DeletePatientRequest::METHOD, HttpMethod::Delete);
    }

    #[test]
    fn resource_requests_put_the_id_in_the_path() {
        let update = UpdatePatientCommand {
            id: "77".into(),
            patient: UpdatePatientRequest {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                address: "12 Elm Street".into(),
                date_of_birth: date("1990-04-02"),
            },
        };
        assert_eq!(update.path(), "/api/patients/77");

        let delete = DeletePatientRequest { id: "77".into() };
        assert_eq!(delete.path(), "/api/patients/77");
    }

    #[test]
    fn update_command_body_flattens_without_id() {
        let update = UpdatePatientCommand {
            id: "77".into(),
            patient: UpdatePatientRequest {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                address: "12 Elm Street".into(),
                date_of_birth: date("1990-04-02"),
            },
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["name"], "Jane");
        assert_eq!(json["dateOfBirth"], "1990-04-02");
    }

    #[test]
    fn only_write_methods_carry_a_body() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }
}
