//! In-memory allow-list checker.

use super::{IntegrityChecker, PluginView};

#[derive(Debug, Clone)]
enum Directive {
    /// Allow by content hash.
    Hash(String),
    /// Allow by declared plugin name.
    Name(String),
}

/// Directive-based allow-list over content hashes and declared names.
///
/// Evaluation is strict: every directive of the relevant kind must match
/// the candidate, so any directive of that kind carrying a different value
/// rejects outright. A kind with zero directives accepts unconditionally
/// on that axis; the empty checker accepts everything and is the
/// manager's default policy.
#[derive(Debug, Clone, Default)]
pub struct AllowListChecker {
    directives: Vec<Directive>,
}

impl AllowListChecker {
    /// Checker with no directives; accepts every plugin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an "allow by content hash" directive.
    pub fn with_allowed_hash(mut self, hash: impl Into<String>) -> Self {
        self.directives.push(Directive::Hash(hash.into()));
        self
    }

    /// Add an "allow by declared name" directive.
    pub fn with_allowed_name(mut self, name: impl Into<String>) -> Self {
        self.directives.push(Directive::Name(name.into()));
        self
    }
}

impl IntegrityChecker for AllowListChecker {
    fn can_open_plugin(&self, content_hash: &str) -> bool {
        for directive in &self.directives {
            if let Directive::Hash(allowed) = directive {
                if allowed != content_hash {
                    return false;
                }
            }
        }
        true
    }

    fn accept_plugin(&self, view: PluginView<'_>) -> bool {
        for directive in &self.directives {
            if let Directive::Name(allowed) = directive {
                if allowed != view.name {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(name: &'a str, hash: &'a str) -> PluginView<'a> {
        PluginView {
            name,
            version: "1.0.0",
            author: "Tests",
            content_hash: hash,
        }
    }

    #[test]
    fn test_empty_checker_accepts_everything() {
        let checker = AllowListChecker::new();
        assert!(checker.can_open_plugin("abc"));
        assert!(checker.accept_plugin(view("Anything", "abc")));
    }

    #[test]
    fn test_hash_directive_gates_opening() {
        let checker = AllowListChecker::new().with_allowed_hash("abc");
        assert!(checker.can_open_plugin("abc"));
        assert!(!checker.can_open_plugin("def"));
    }

    #[test]
    fn test_name_directive_gates_acceptance() {
        let checker = AllowListChecker::new().with_allowed_name("Example");
        assert!(checker.accept_plugin(view("Example", "abc")));
        assert!(!checker.accept_plugin(view("Other", "abc")));
    }

    #[test]
    fn test_directive_kinds_are_independent_axes() {
        let checker = AllowListChecker::new().with_allowed_name("Example");
        // no hash directives: the hash axis accepts anything
        assert!(checker.can_open_plugin("whatever"));

        let checker = AllowListChecker::new().with_allowed_hash("abc");
        // no name directives: the identity axis accepts anything
        assert!(checker.accept_plugin(view("Other", "abc")));
    }

    #[test]
    fn test_every_directive_of_a_kind_must_match() {
        // two different hash directives can never both match one candidate
        let checker = AllowListChecker::new()
            .with_allowed_hash("abc")
            .with_allowed_hash("def");
        assert!(!checker.can_open_plugin("abc"));
        assert!(!checker.can_open_plugin("def"));

        // duplicated identical directives still match
        let checker = AllowListChecker::new()
            .with_allowed_hash("abc")
            .with_allowed_hash("abc");
        assert!(checker.can_open_plugin("abc"));
    }
}
