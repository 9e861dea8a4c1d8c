//! Pre-flight syntax checking for ref names.
//!
//! Mirrors git's own ref grammar closely enough to reject unsafe input
//! before a process is spawned, rather than relying on git to refuse it.
//! Every name-like input to a mutating command goes through [`is_valid`].

const MAX_REF_NAME_LEN: usize = 255;

/// Whether `name` is safe to interpolate into a git command line.
pub fn is_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_REF_NAME_LEN {
        return false;
    }
    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return false;
    }
    if name.contains("..") || name.contains("@{") {
        return false;
    }
    if name.contains('\\') || name.contains('\0') {
        return false;
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'))
    {
        return false;
    }
    for segment in name.split('/') {
        if segment.starts_with('.') || segment.ends_with(".lock") {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_names() {
        assert!(is_valid("main"));
        assert!(is_valid("feature/add-x"));
        assert!(is_valid("origin/main"));
        assert!(is_valid("release-1.2.3"));
        assert!(is_valid("users/jane_doe/wip"));
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(!is_valid(""));
        assert!(!is_valid(&"a".repeat(256)));
        assert!(is_valid(&"a".repeat(255)));
    }

    #[test]
    fn rejects_slash_abuse() {
        assert!(!is_valid("/main"));
        assert!(!is_valid("main/"));
        assert!(!is_valid("feature//x"));
    }

    #[test]
    fn rejects_dot_segments_and_lock_suffix() {
        assert!(!is_valid(".hidden"));
        assert!(!is_valid("feature/.wip"));
        assert!(!is_valid("main.lock"));
        assert!(!is_valid("feature/x.lock"));
    }

    #[test]
    fn rejects_unsafe_sequences() {
        assert!(!is_valid("a..b"));
        assert!(!is_valid("a@{1}"));
        assert!(!is_valid("a\\b"));
        assert!(!is_valid("a\0b"));
        assert!(!is_valid("a b"));
        assert!(!is_valid("a~1"));
        assert!(!is_valid("a^b"));
        assert!(!is_valid("a:b"));
        assert!(!is_valid("a?b"));
        assert!(!is_valid("a*b"));
        assert!(!is_valid("a[b"));
    }
}
