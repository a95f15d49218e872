use crate::error::Result;
use crate::io;
use crate::task::Task;
use std::path::{Path, PathBuf};

/// Fixed instruction block appended to every generated command file.
/// Tells the invoking agent how to close out the task and what follows.
const TASK_INSTRUCTIONS: &str = "## Instructions

Work on this task only; do not start the next one.

1. Follow the task description above, using the leverage and requirements
   references where given.
2. When the change is complete, mark the task done in tasks.md: change its
   checkbox from `[ ]` to `[x]`.
3. Stop so the user can review, then continue with the next task command
   or check overall progress with /spec-status.
";

/// Filename for the command file of one task: `{spec-name}-task-{id}.md`.
pub fn command_file_name(spec_name: &str, task_id: &str) -> String {
    format!("{spec_name}-task-{task_id}.md")
}

/// Render the full content of a task command file.
///
/// Pure function of the task record and spec name: identical inputs yield
/// byte-identical output.
pub fn render_task_command(spec_name: &str, task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {spec_name} - Task {}\n", task.id));
    out.push('\n');
    out.push_str(&task.description);
    out.push('\n');
    if let Some(leverage) = &task.leverage {
        out.push_str(&format!("**Leverage**: {leverage}\n"));
    }
    if !task.requirements.is_empty() {
        out.push_str(&format!(
            "**Requirements**: {}\n",
            task.requirements.join(", ")
        ));
    }
    for detail in &task.details {
        out.push_str(&format!("- {detail}\n"));
    }
    out.push('\n');
    out.push_str(TASK_INSTRUCTIONS);
    out
}

/// Write the command file for `task` into `dest_dir`, creating the
/// directory if needed. Overwrites any existing file at the same path.
/// Returns the path written.
pub fn write_task_command(dest_dir: &Path, spec_name: &str, task: &Task) -> Result<PathBuf> {
    let path = dest_dir.join(command_file_name(spec_name, &task.id));
    io::write_text(&path, &render_task_command(spec_name, task))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
