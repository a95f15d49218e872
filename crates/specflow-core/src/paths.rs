use crate::error::{Result, SpecflowError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CLAUDE_DIR: &str = ".claude";
pub const COMMANDS_DIR: &str = ".claude/commands";
pub const SPECS_DIR: &str = ".claude/specs";
pub const TEMPLATES_DIR: &str = ".claude/templates";

pub const CONFIG_FILE: &str = ".claude/spec-config.json";
pub const TASKS_FILE: &str = "tasks.md";

pub const CLAUDE_MD: &str = "CLAUDE.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn claude_dir(root: &Path) -> PathBuf {
    root.join(CLAUDE_DIR)
}

pub fn commands_dir(root: &Path) -> PathBuf {
    root.join(COMMANDS_DIR)
}

pub fn spec_commands_dir(root: &Path, spec_name: &str) -> PathBuf {
    root.join(COMMANDS_DIR).join(spec_name)
}

pub fn spec_dir(root: &Path, spec_name: &str) -> PathBuf {
    root.join(SPECS_DIR).join(spec_name)
}

pub fn tasks_path(root: &Path, spec_name: &str) -> PathBuf {
    spec_dir(root, spec_name).join(TASKS_FILE)
}

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn claude_md_path(root: &Path) -> PathBuf {
    root.join(CLAUDE_MD)
}

// ---------------------------------------------------------------------------
// Spec name validation
// ---------------------------------------------------------------------------

static SPEC_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn spec_name_re() -> &'static Regex {
    SPEC_NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_spec_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !spec_name_re().is_match(name) {
        return Err(SpecflowError::InvalidSpecName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_spec_names() {
        for name in ["user-auth", "a", "payment-flow-v2", "x1"] {
            validate_spec_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_spec_names() {
        for name in [
            "",
            "-starts-with-dash",
            "ends-with-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_spec_name(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.claude/spec-config.json")
        );
        assert_eq!(
            tasks_path(root, "auth"),
            PathBuf::from("/tmp/proj/.claude/specs/auth/tasks.md")
        );
        assert_eq!(
            spec_commands_dir(root, "auth"),
            PathBuf::from("/tmp/proj/.claude/commands/auth")
        );
    }
}
