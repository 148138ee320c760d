use serde::{Deserialize, Serialize};

/// Container metadata as listed by the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    /// Unix timestamp, seconds.
    pub created_at: i64,
    /// Free-text status, e.g. `Exited (0) 2 days ago`.
    pub status: String,
}

impl Container {
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/'))
            .unwrap_or_else(|| self.short_id())
    }
}

/// Image metadata as listed by the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    /// Unix timestamp, seconds.
    pub created_at: i64,
    /// Bytes.
    pub size: i64,
    /// `repo/name:tag` references.
    pub repo_tags: Vec<String>,
}

impl Image {
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn display_name(&self) -> String {
        if self.repo_tags.is_empty() {
            self.short_id().to_string()
        } else {
            self.repo_tags.join(", ")
        }
    }
}

/// Split `repo/name:tag` at the last `:`.
///
/// A colon followed by a path segment belongs to a registry port, so
/// `localhost:5000/app` has no tag.
pub fn split_repo_tag(reference: &str) -> (&str, Option<&str>) {
    match reference.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name, Some(tag)),
        _ => (reference, None),
    }
}

/// 12-character id without the digest algorithm prefix.
pub fn short_id(id: &str) -> &str {
    let id = id.split_once(':').map(|(_, hex)| hex).unwrap_or(id);
    id.get(..12).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_repo_tag() {
        assert_eq!(split_repo_tag("nginx:1.25"), ("nginx", Some("1.25")));
        assert_eq!(
            split_repo_tag("registry.cn-shenzhen.aliyuncs.com/jzdev/back:v0.8.0"),
            ("registry.cn-shenzhen.aliyuncs.com/jzdev/back", Some("v0.8.0"))
        );
        assert_eq!(
            split_repo_tag("localhost:5000/team/app:latest"),
            ("localhost:5000/team/app", Some("latest"))
        );
        assert_eq!(split_repo_tag("localhost:5000/app"), ("localhost:5000/app", None));
        assert_eq!(split_repo_tag("untagged"), ("untagged", None));
        assert_eq!(split_repo_tag("<none>:<none>"), ("<none>", Some("<none>")));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(
            short_id("sha256:4a1c5e7f9b2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f"),
            "4a1c5e7f9b2d"
        );
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_display_names() {
        let container = Container {
            id: "0123456789abcdef".to_string(),
            names: vec!["/web".to_string()],
            ..Default::default()
        };
        assert_eq!(container.display_name(), "web");

        let image = Image {
            id: "sha256:0123456789abcdef".to_string(),
            ..Default::default()
        };
        assert_eq!(image.display_name(), "0123456789ab");
    }
}
