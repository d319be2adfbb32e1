use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod protocol;

// =========================================================
// 认证模型 (Auth Models)
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 患者档案
///
/// `id` 与 `registered_date` 的生命周期完全由服务端管理，
/// 客户端只持有当前集合的临时缓存副本。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

impl Patient {
    /// 姓名首字母缩写（头像占位用），最多取两个词的首字母
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(|c| c.to_uppercase())
            .collect()
    }

    /// 搜索匹配：姓名 / 邮箱 / 地址，忽略大小写
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.address.to_lowercase().contains(&term)
    }
}

/// 新建患者请求：除 `id` 外的全部字段
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// 更新患者请求：不携带 `id` 与 `registered_date`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_patient() -> Patient {
        Patient {
            id: "p-1".into(),
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            address: "12 Elm Street".into(),
            date_of_birth: date("1990-04-02"),
            registered_date: date("2026-01-15"),
        }
    }

    #[test]
    fn patient_wire_names_are_camel_case() {
        let json = serde_json::to_value(sample_patient()).unwrap();
        assert_eq!(json["dateOfBirth"], "1990-04-02");
        assert_eq!(json["registeredDate"], "2026-01-15");
        assert!(json.get("date_of_birth").is_none());
    }

    #[test]
    fn patient_parses_from_backend_shape() {
        let raw = r#"{
            "id": "42",
            "name": "John Smith",
            "email": "john@example.com",
            "address": "1 Main St",
            "dateOfBirth": "1985-12-31",
            "registeredDate": "2026-02-01"
        }"#;
        let patient: Patient = serde_json::from_str(raw).unwrap();
        assert_eq!(patient.id, "42");
        assert_eq!(patient.date_of_birth, date("1985-12-31"));
    }

    #[test]
    fn update_body_never_carries_id_or_registered_date() {
        let body = UpdatePatientRequest {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            address: "12 Elm Street".into(),
            date_of_birth: date("1990-04-02"),
        };
        let json = serde_json::to_value(&body).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert!(!keys.contains(&"id".to_string()));
        assert!(!keys.contains(&"registeredDate".to_string()));
    }

    #[test]
    fn initials_take_at_most_two_words() {
        assert_eq!(sample_patient().initials(), "JD");
        let mut single = sample_patient();
        single.name = "Prince".into();
        assert_eq!(single.initials(), "P");
        let mut triple = sample_patient();
        triple.name = "Ana Maria Silva".into();
        assert_eq!(triple.initials(), "AM");
    }

    #[test]
    fn search_matches_name_email_and_address() {
        let patient = sample_patient();
        assert!(patient.matches(""));
        assert!(patient.matches("jane"));
        assert!(patient.matches("EXAMPLE.COM"));
        assert!(patient.matches("elm"));
        assert!(!patient.matches("nowhere"));
    }
}
