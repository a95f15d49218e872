use crate::output::{print_json, print_table};
use crate::reporter::Reporter;
use anyhow::Context;
use specflow_core::{command_gen, paths, task, SpecflowError};
use std::path::Path;

pub fn run(
    root: &Path,
    spec_name: &str,
    json: bool,
    reporter: &dyn Reporter,
) -> anyhow::Result<()> {
    paths::validate_spec_name(spec_name)?;

    let tasks_path = paths::tasks_path(root, spec_name);
    if !tasks_path.exists() {
        return Err(SpecflowError::TasksNotFound(spec_name.to_string()))
            .with_context(|| format!("missing {}", tasks_path.display()));
    }

    let content = std::fs::read_to_string(&tasks_path)
        .with_context(|| format!("failed to read {}", tasks_path.display()))?;
    let tasks = task::parse_tasks(&content);

    if tasks.is_empty() {
        reporter.progress(&format!(
            "No tasks found in {}",
            tasks_path.display()
        ));
        if json {
            print_json(&serde_json::json!({
                "spec": spec_name,
                "tasks": [],
                "generated": [],
            }))?;
        }
        return Ok(());
    }

    let dest = paths::spec_commands_dir(root, spec_name);
    reporter.progress(&format!(
        "Generating {} task commands for '{spec_name}':",
        tasks.len()
    ));

    let mut generated: Vec<String> = Vec::with_capacity(tasks.len());
    for t in &tasks {
        let path = match command_gen::write_task_command(&dest, spec_name, t) {
            Ok(p) => p,
            Err(e) => {
                reporter.failure(&format!("failed: task {}", t.id));
                return Err(e)
                    .with_context(|| format!("failed to write command for task {}", t.id));
            }
        };
        let display = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .display()
            .to_string();
        reporter.success(&format!("created: {display}"));
        generated.push(display);
    }

    if json {
        print_json(&serde_json::json!({
            "spec": spec_name,
            "tasks": tasks,
            "generated": generated,
        }))?;
    } else {
        reporter.progress("");
        let rows: Vec<Vec<String>> = tasks
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    if t.completed { "done" } else { "open" }.to_string(),
                    t.description.clone(),
                ]
            })
            .collect();
        print_table(&["ID", "STATUS", "DESCRIPTION"], rows);
        reporter.progress(&format!(
            "\n{spec_name}: {}",
            task::summarize(&tasks)
        ));
        reporter.progress("Restart your Claude Code session to pick up the new commands.");
    }

    Ok(())
}
