use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub fcm_token: Option<String>,
}

impl User {
    /// The push token of the user, if there is a usable one
    pub fn push_token(&self) -> Option<&str> {
        self.fcm_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{doc, from_document, Bson};

    use super::*;

    #[test]
    fn test_push_token() {
        let user: User = from_document(doc! {"id": "u1", "fcmToken": "tok1"}).unwrap();
        assert_eq!(user.push_token(), Some("tok1"));
        let user: User = from_document(doc! {"id": "u1"}).unwrap();
        assert_eq!(user.push_token(), None);
        let user: User = from_document(doc! {"id": "u1", "fcmToken": Bson::Null}).unwrap();
        assert_eq!(user.push_token(), None);
        let user: User = from_document(doc! {"id": "u1", "fcmToken": "  "}).unwrap();
        assert_eq!(user.push_token(), None);
    }
}
