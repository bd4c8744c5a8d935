//! The extension rewrite policy shared by every conversion flow.
//!
//! A file is convertible when its name ends, case-insensitively, in `.php`
//! or `.sql`; the rewrite swaps that suffix for `.txt`. Only the final
//! suffix is considered (`backup.sql.gz` is not eligible), and everything
//! before it (directory prefixes, the stem's original casing) is preserved.
//!
//! The policy is a pure function and idempotent: its output never ends in a
//! source suffix, so running it twice is a no-op.

/// Suffixes the policy rewrites, lowercase, without the dot.
pub const SOURCE_EXTENSIONS: &[&str] = &["php", "sql"];

/// The suffix every rewritten name receives.
pub const TARGET_EXTENSION: &str = "txt";

/// Outcome of running the policy on one file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDecision {
    /// True when the name matched a source suffix.
    pub eligible: bool,
    /// The rewritten name, or the input unchanged when not eligible.
    pub new_name: String,
}

/// Decide whether `name` is convertible and compute its target name.
pub fn decide(name: &str) -> RenameDecision {
    for ext in SOURCE_EXTENSIONS {
        if let Some(stem) = match_suffix(name, ext) {
            return RenameDecision {
                eligible: true,
                new_name: format!("{stem}.{TARGET_EXTENSION}"),
            };
        }
    }
    RenameDecision {
        eligible: false,
        new_name: name.to_string(),
    }
}

/// Convenience wrapper for callers that only need the yes/no answer.
pub fn is_eligible(name: &str) -> bool {
    decide(name).eligible
}

/// If `name` ends in `.{ext}` (ASCII case-insensitive), return the part
/// before the dot. Byte-indexed on the original string so the stem's case
/// and any non-ASCII content survive untouched.
fn match_suffix<'a>(name: &'a str, ext: &str) -> Option<&'a str> {
    let suffix_len = ext.len() + 1; // dot included
    if name.len() < suffix_len || !name.is_char_boundary(name.len() - suffix_len) {
        return None;
    }
    let (stem, tail) = name.split_at(name.len() - suffix_len);
    if tail.as_bytes()[0] == b'.' && tail[1..].eq_ignore_ascii_case(ext) {
        Some(stem)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn php_lowercase() {
        let d = decide("index.php");
        assert!(d.eligible);
        assert_eq!(d.new_name, "index.txt");
    }

    #[test]
    fn sql_lowercase() {
        let d = decide("dump.sql");
        assert!(d.eligible);
        assert_eq!(d.new_name, "dump.txt");
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        for name in ["a.PHP", "a.Php", "a.pHp", "b.SQL", "b.Sql"] {
            assert!(decide(name).eligible, "{name} should be eligible");
        }
    }

    #[test]
    fn stem_case_is_preserved() {
        let d = decide("MyScript.PHP");
        assert_eq!(d.new_name, "MyScript.txt");
    }

    #[test]
    fn directory_prefix_is_preserved() {
        let d = decide("src/admin/Login.php");
        assert!(d.eligible);
        assert_eq!(d.new_name, "src/admin/Login.txt");
    }

    #[test]
    fn non_matching_name_is_unchanged() {
        let d = decide("readme.md");
        assert!(!d.eligible);
        assert_eq!(d.new_name, "readme.md");
    }

    #[test]
    fn only_final_suffix_counts() {
        assert!(!decide("backup.sql.gz").eligible);
        assert!(decide("backup.gz.sql").eligible);
    }

    #[test]
    fn extension_without_dot_is_not_eligible() {
        assert!(!decide("php").eligible);
        assert!(!decide("sql").eligible);
    }

    #[test]
    fn bare_dot_extension_is_eligible() {
        // Matches the suffix rule exactly: ".php" ends in ".php".
        let d = decide(".php");
        assert!(d.eligible);
        assert_eq!(d.new_name, ".txt");
    }

    #[test]
    fn idempotent_on_its_own_output() {
        for name in ["index.php", "dump.SQL", "src/a.Php", "readme.md"] {
            let once = decide(name);
            let twice = decide(&once.new_name);
            assert!(!twice.eligible, "{name} rewritten twice");
            assert_eq!(twice.new_name, once.new_name);
        }
    }

    #[test]
    fn non_ascii_stem_survives() {
        let d = decide("ملف-قاعدة-البيانات.sql");
        assert!(d.eligible);
        assert_eq!(d.new_name, "ملف-قاعدة-البيانات.txt");
    }

    #[test]
    fn empty_name_is_not_eligible() {
        let d = decide("");
        assert!(!d.eligible);
        assert_eq!(d.new_name, "");
    }
}
