//! Application group inference.

use webconf_registry::{APP_GROUP_NAME, APP_ROOT, ENVIRONMENT};

use super::DriverOptions;

/// Settings that decide which application a context belongs to. Each
/// context inherits its parent's values and overrides the ones it sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScopeValues {
    pub app_group_name: Option<String>,
    pub app_root: Option<String>,
    pub environment: Option<String>,
    pub root: Option<String>,
}

impl ScopeValues {
    /// Values of a child context. `explicit` returns the string value the
    /// child sets for an option, if any.
    pub fn child<F>(&self, root: Option<&str>, explicit: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            app_group_name: explicit(APP_GROUP_NAME).or_else(|| self.app_group_name.clone()),
            app_root: explicit(APP_ROOT).or_else(|| self.app_root.clone()),
            environment: explicit(ENVIRONMENT).or_else(|| self.environment.clone()),
            root: root.map(str::to_string).or_else(|| self.root.clone()),
        }
    }

    /// The application group name: an explicit `app_group_name`, otherwise
    /// `"<app root> (<environment>)"`.
    pub fn app_group_name(&self, options: &DriverOptions) -> String {
        if let Some(name) = &self.app_group_name {
            return name.clone();
        }

        let app_root = match &self.app_root {
            Some(app_root) => app_root.clone(),
            None => {
                let root = self.root.as_deref().unwrap_or(&options.default_root);
                format!("{}/..", root)
            }
        };
        let app_root = normalize(&absolutize(&app_root, &options.prefix));
        let environment = self
            .environment
            .as_deref()
            .unwrap_or(&options.default_environment);

        format!("{} ({})", app_root, environment)
    }
}

/// Resolve a relative path against the server prefix.
fn absolutize(path: &str, prefix: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), path)
    }
}

/// Lexically collapse `.`, `..` and repeated separators. `..` never climbs
/// above the root.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> DriverOptions {
        DriverOptions::default()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/usr/local/nginx/html/.."), "/usr/local/nginx");
        assert_eq!(normalize("/srv//app/./public/../"), "/srv/app");
        assert_eq!(normalize("/../.."), "/");
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize("html", "/usr/local/nginx/"), "/usr/local/nginx/html");
        assert_eq!(absolutize("/srv/app", "/usr/local/nginx"), "/srv/app");
    }

    #[test]
    fn test_group_from_default_root() {
        let values = ScopeValues::default();
        assert_eq!(values.app_group_name(&options()), "/usr/local/nginx (production)");
    }

    #[test]
    fn test_group_from_document_root_and_environment() {
        let values = ScopeValues {
            root: Some("/srv/shop/public".to_string()),
            environment: Some("staging".to_string()),
            ..Default::default()
        };
        assert_eq!(values.app_group_name(&options()), "/srv/shop (staging)");
    }

    #[test]
    fn test_app_root_beats_document_root() {
        let values = ScopeValues {
            root: Some("/srv/shop/public".to_string()),
            app_root: Some("/srv/other".to_string()),
            ..Default::default()
        };
        assert_eq!(values.app_group_name(&options()), "/srv/other (production)");
    }

    #[test]
    fn test_explicit_group_name_wins() {
        let values = ScopeValues {
            app_group_name: Some("shop".to_string()),
            app_root: Some("/srv/other".to_string()),
            ..Default::default()
        };
        assert_eq!(values.app_group_name(&options()), "shop");
    }

    #[test]
    fn test_child_overrides_and_inherits() {
        let parent = ScopeValues {
            root: Some("/srv/a/public".to_string()),
            environment: Some("staging".to_string()),
            ..Default::default()
        };
        let child = parent.child(Some("/srv/b/public"), |name| {
            (name == APP_GROUP_NAME).then(|| "b".to_string())
        });
        assert_eq!(child.root.as_deref(), Some("/srv/b/public"));
        assert_eq!(child.environment.as_deref(), Some("staging"));
        assert_eq!(child.app_group_name.as_deref(), Some("b"));
        assert!(child.app_root.is_none());
    }
}
