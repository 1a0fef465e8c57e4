//! Path template compilation.

use ariadne_core::{ContractError, ContractResult};
use regex::Regex;

/// A path template compiled into an anchored matcher.
#[derive(Debug, Clone)]
pub(crate) struct CompiledTemplate {
    /// The template as used for matching (normalised).
    pub(crate) path: String,
    /// Full-string matcher with one capture group per placeholder.
    pub(crate) pattern: Regex,
    /// Placeholder names in positional order.
    pub(crate) param_names: Vec<String>,
    /// Length of the template with all placeholders removed.
    pub(crate) specificity: usize,
}

impl CompiledTemplate {
    /// Compiles a template such as `/pets/{id}` or `/files/{name}.{ext}`.
    pub(crate) fn compile(template: &str, ignore_trailing_slashes: bool) -> ContractResult<Self> {
        let mut path = format!("/{}", template.trim_start_matches('/'));
        if ignore_trailing_slashes {
            path = crate::path::strip_trailing_slashes(&path).to_string();
        }

        let mut pattern = String::from("^");
        let mut param_names = Vec::new();
        let mut specificity = 0;

        let mut rest = path.as_str();
        while let Some(open) = rest.find('{') {
            let close = rest[open..].find('}').map(|c| open + c).ok_or_else(|| {
                ContractError::InvalidPathTemplate {
                    template: template.to_string(),
                    reason: "unclosed '{'".to_string(),
                }
            })?;
            let name = &rest[open + 1..close];
            if name.is_empty() || name.contains(['{', '/']) {
                return Err(ContractError::InvalidPathTemplate {
                    template: template.to_string(),
                    reason: format!("invalid placeholder '{{{name}}}'"),
                });
            }

            specificity += open;
            pattern.push_str(&regex::escape(&rest[..open]));
            pattern.push_str("([^/]+)");
            param_names.push(name.to_string());

            rest = &rest[close + 1..];
        }
        specificity += rest.len();
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|e| ContractError::InvalidPathTemplate {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path,
            pattern,
            param_names,
            specificity,
        })
    }

    /// Returns true when the template has no placeholders.
    pub(crate) fn is_literal(&self) -> bool {
        self.param_names.is_empty()
    }

    /// Matches a path and binds placeholder values positionally.
    pub(crate) fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let captures = self.pattern.captures(path)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    captures
                        .get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template() {
        let t = CompiledTemplate::compile("/pets/meta", true).unwrap();
        assert!(t.is_literal());
        assert_eq!(t.specificity, "/pets/meta".len());
        assert!(t.pattern.is_match("/pets/meta"));
        assert!(!t.pattern.is_match("/pets/meta/x"));
    }

    #[test]
    fn test_placeholder_capture() {
        let t = CompiledTemplate::compile("/pets/{id}/owner", true).unwrap();
        assert_eq!(t.specificity, "/pets//owner".len());
        assert_eq!(
            t.captures("/pets/42/owner"),
            Some(vec![("id".to_string(), "42".to_string())])
        );
        assert!(t.captures("/pets/42/7/owner").is_none());
    }

    #[test]
    fn test_mid_segment_placeholders() {
        let t = CompiledTemplate::compile("/files/{name}.{ext}", true).unwrap();
        let caps = t.captures("/files/report.pdf").unwrap();
        assert_eq!(caps[0], ("name".to_string(), "report".to_string()));
        assert_eq!(caps[1], ("ext".to_string(), "pdf".to_string()));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let t = CompiledTemplate::compile("/v1.0/items+", true).unwrap();
        assert!(t.pattern.is_match("/v1.0/items+"));
        assert!(!t.pattern.is_match("/v1x0/itemss"));
    }

    #[test]
    fn test_trailing_slash_handling() {
        let ignored = CompiledTemplate::compile("/pets/", true).unwrap();
        assert_eq!(ignored.path, "/pets");
        let kept = CompiledTemplate::compile("/pets/", false).unwrap();
        assert_eq!(kept.path, "/pets/");
    }

    #[test]
    fn test_unclosed_placeholder() {
        assert!(matches!(
            CompiledTemplate::compile("/pets/{id", true),
            Err(ContractError::InvalidPathTemplate { .. })
        ));
        assert!(CompiledTemplate::compile("/pets/{}", true).is_err());
    }
}
