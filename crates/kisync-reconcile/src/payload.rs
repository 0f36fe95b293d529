//! The known-issue body sent to the remote API.

use kisync_core::KnownIssue;
use kisync_remote::{Record, RemoteEnvironment};
use serde_json::Value;

/// Body of a known-issue create or update, built fresh per reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownIssuePayload {
    pub title: String,
    pub test_name: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
    pub intermittent: Option<bool>,
    /// Environment URLs.
    pub environment: Vec<String>,
}

impl KnownIssuePayload {
    #[must_use]
    pub fn new(issue: &KnownIssue, environments: &[RemoteEnvironment]) -> Self {
        Self {
            title: issue.title().to_string(),
            test_name: issue.test_name().to_string(),
            url: issue.url().map(str::to_string),
            notes: issue.notes().map(str::to_string),
            active: issue.active(),
            intermittent: issue.intermittent(),
            environment: environments.iter().map(|env| env.url.clone()).collect(),
        }
    }

    /// JSON object form. Unset optional fields are left out, not sent as null.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("title".into(), Value::from(self.title.clone()));
        record.insert("test_name".into(), Value::from(self.test_name.clone()));
        if let Some(url) = &self.url {
            record.insert("url".into(), Value::from(url.clone()));
        }
        if let Some(notes) = &self.notes {
            record.insert("notes".into(), Value::from(notes.clone()));
        }
        if let Some(active) = self.active {
            record.insert("active".into(), Value::from(active));
        }
        if let Some(intermittent) = self.intermittent {
            record.insert("intermittent".into(), Value::from(intermittent));
        }
        record.insert("environment".into(), Value::from(self.environment.clone()));
        record
    }

    /// Overlay this payload on an existing remote record. Fields the payload
    /// does not carry, `id` among them, keep their remote values.
    #[must_use]
    pub fn merge_into(&self, mut existing: Record) -> Record {
        existing.extend(self.to_record());
        existing
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn payload() -> KnownIssuePayload {
        KnownIssuePayload {
            title: "LKFT/boot/test1".into(),
            test_name: "boot/test1".into(),
            url: None,
            notes: Some("flaky".into()),
            active: Some(true),
            intermittent: None,
            environment: vec!["https://qa/api/environments/1/".into()],
        }
    }

    #[test]
    fn unset_fields_are_omitted() {
        assert_eq!(
            Value::Object(payload().to_record()),
            json!({
                "title": "LKFT/boot/test1",
                "test_name": "boot/test1",
                "notes": "flaky",
                "active": true,
                "environment": ["https://qa/api/environments/1/"],
            })
        );
    }

    #[test]
    fn merge_preserves_identity_and_unmanaged_fields() {
        let existing: Record = serde_json::from_value(json!({
            "id": 17,
            "url": "https://bugs.linaro.org/1",
            "title": "LKFT/boot/test1",
            "test_name": "boot/test1",
            "notes": "old",
            "intermittent": true,
            "environment": [],
        }))
        .unwrap();

        let merged = payload().merge_into(existing);
        assert_eq!(merged["id"], json!(17));
        assert_eq!(merged["url"], json!("https://bugs.linaro.org/1"));
        assert_eq!(merged["notes"], json!("flaky"));
        assert_eq!(merged["intermittent"], json!(true));
        assert_eq!(merged["environment"], json!(["https://qa/api/environments/1/"]));
    }
}
