use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A post from `/posts`. Only `title` is interpreted; everything else is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "title_from_any")]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept any JSON value as a title: strings as-is, null as empty,
/// anything else in its JSON text form.
fn title_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl Post {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            extra: Map::new(),
        }
    }

    /// Title for display, with a placeholder for blank titles
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_unknown_fields() {
        let json = r#"{"username":"kyle","title":"Post 1","id":7}"#;
        let post: Post = serde_json::from_str(json).expect("Failed to parse post JSON");
        assert_eq!(post.title, "Post 1");
        assert_eq!(post.extra.get("username"), Some(&Value::from("kyle")));
        assert_eq!(post.extra.get("id"), Some(&Value::from(7)));

        let out = serde_json::to_value(&post).expect("Failed to serialize post");
        assert_eq!(out["id"], 7);
        assert_eq!(out["title"], "Post 1");
    }

    #[test]
    fn test_missing_title() {
        let post: Post = serde_json::from_str(r#"{"id":1}"#).expect("Failed to parse post JSON");
        assert_eq!(post.title, "");
        assert_eq!(post.display_title(), "(untitled)");
        assert_eq!(Post::new("  ").display_title(), "(untitled)");
        assert_eq!(Post::new("Hello").display_title(), "Hello");
    }

    #[test]
    fn test_non_string_titles() {
        let json = r#"[{"title":null},{"title":42},{"title":true},{"title":"ok"}]"#;
        let posts: Vec<Post> = serde_json::from_str(json).expect("Failed to parse posts JSON");
        let titles: Vec<&str> = posts.iter().map(|p| p.display_title()).collect();
        assert_eq!(titles, ["(untitled)", "42", "true", "ok"]);
    }

    #[test]
    fn test_extra_fields_keep_order() {
        let json = r#"{"zeta":1,"title":"T","alpha":2,"mid":3}"#;
        let post: Post = serde_json::from_str(json).expect("Failed to parse post JSON");
        let keys: Vec<&str> = post.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        let out = serde_json::to_string(&post).expect("Failed to serialize post");
        assert_eq!(out, r#"{"title":"T","zeta":1,"alpha":2,"mid":3}"#);
    }
}
