use serde::Deserialize;
use time::OffsetDateTime;

/// Caller-supplied customer fields for `save` and `create`.
///
/// `id == 0` means the customer does not exist yet. A missing `created` means
/// "now" on insert and "keep the stored value" on update by id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerDraft {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created: Option<OffsetDateTime>,
}

fn default_active() -> bool {
    true
}

impl CustomerDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            phone: phone.into(),
            active: true,
            created: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let draft: CustomerDraft =
            serde_json::from_str(r#"{"name":"A","phone":"+1000"}"#).expect("decode");
        assert_eq!(draft, CustomerDraft::new("A", "+1000"));
        assert!(draft.is_new());
    }

    #[test]
    fn explicit_fields_are_kept() {
        let draft: CustomerDraft = serde_json::from_str(
            r#"{"id":5,"name":"B","phone":"+2000","active":false,"created":"2024-01-02T03:04:05Z"}"#,
        )
        .expect("decode");
        assert_eq!(draft.id, 5);
        assert!(!draft.active);
        assert_eq!(draft.created, Some(time::macros::datetime!(2024-01-02 03:04:05 UTC)));
        assert!(!draft.is_new());
    }
}
