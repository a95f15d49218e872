use crate::reporter::Reporter;
use anyhow::Context;
use specflow_core::{config::SpecConfig, io, paths};
use std::path::Path;

/// Version of the specflow binary embedded at compile time.
pub const SPECFLOW_BINARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marker that delimits the managed section in CLAUDE.md.
pub const SPECFLOW_SECTION_START: &str = "<!-- specflow:start -->";
/// Closing marker for the managed section in CLAUDE.md.
pub const SPECFLOW_SECTION_END: &str = "<!-- specflow:end -->";

pub fn run(root: &Path, force: bool, reporter: &dyn Reporter) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    reporter.progress(&format!(
        "Setting up spec workflow in: {}",
        root.display()
    ));

    // 1. Create the .claude directory tree
    let dirs = [
        paths::CLAUDE_DIR,
        paths::COMMANDS_DIR,
        paths::SPECS_DIR,
        paths::TEMPLATES_DIR,
    ];
    for dir in dirs {
        let p = root.join(dir);
        std::fs::create_dir_all(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    // 2. Write spec-config.json if missing (or reset with --force), then
    //    stamp the binary version
    write_config(root, force, reporter)?;

    // 3. Install workflow commands (managed content, always refreshed)
    reporter.progress("\nInstalling workflow commands:");
    write_workflow_commands(root, reporter)?;

    // 4. Install document templates (managed content, always refreshed)
    reporter.progress("\nInstalling document templates:");
    write_templates(root, reporter)?;

    // 5. Write / refresh the managed CLAUDE.md section
    reporter.progress("");
    write_claude_md(root, &project_name, reporter)?;

    reporter.progress("\nSpec workflow ready.");
    reporter.progress("Next: run /spec-create <feature-name> in Claude Code");

    Ok(())
}

fn write_config(root: &Path, force: bool, reporter: &dyn Reporter) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    if force || !config_path.exists() {
        let cfg = SpecConfig {
            specflow_version: Some(SPECFLOW_BINARY_VERSION.to_string()),
            ..SpecConfig::default()
        };
        cfg.save(root).context("failed to write spec-config.json")?;
        reporter.success("created: .claude/spec-config.json");
    } else {
        stamp_version(root, reporter)?;
        reporter.success("exists:  .claude/spec-config.json");
    }
    Ok(())
}

/// Stamp the current binary version into `spec-config.json`.
/// Idempotent, only writes if the stored version differs. User-edited
/// workflow flags are preserved.
fn stamp_version(root: &Path, reporter: &dyn Reporter) -> anyhow::Result<()> {
    let config = SpecConfig::load(root).context("failed to load spec-config.json")?;
    if config.specflow_version.as_deref() != Some(SPECFLOW_BINARY_VERSION) {
        let previous = config
            .specflow_version
            .as_deref()
            .unwrap_or("none")
            .to_string();
        let mut updated = config;
        updated.specflow_version = Some(SPECFLOW_BINARY_VERSION.to_string());
        updated
            .save(root)
            .context("failed to save spec-config.json")?;
        reporter.success(&format!(
            "stamped: .claude/spec-config.json ({previous} -> {SPECFLOW_BINARY_VERSION})"
        ));
    }
    Ok(())
}

fn write_workflow_commands(root: &Path, reporter: &dyn Reporter) -> anyhow::Result<()> {
    write_managed_files(
        &paths::commands_dir(root),
        ".claude/commands",
        WORKFLOW_COMMANDS,
        reporter,
    )
}

fn write_templates(root: &Path, reporter: &dyn Reporter) -> anyhow::Result<()> {
    write_managed_files(
        &paths::templates_dir(root),
        ".claude/templates",
        DOCUMENT_TEMPLATES,
        reporter,
    )
}

/// Upsert managed files into a directory.
/// Reports "created:" or "updated:" based on whether the file existed.
fn write_managed_files(
    dir: &Path,
    display_prefix: &str,
    files: &[(&str, &str)],
    reporter: &dyn Reporter,
) -> anyhow::Result<()> {
    for (filename, content) in files {
        let path = dir.join(filename);
        let existed = path.exists();
        io::write_text(&path, content)?;
        if existed {
            reporter.success(&format!("updated: {display_prefix}/{filename}"));
        } else {
            reporter.success(&format!("created: {display_prefix}/{filename}"));
        }
    }

    Ok(())
}

/// Write or refresh the spec workflow section in CLAUDE.md.
///
/// - Creates CLAUDE.md with markers if it doesn't exist.
/// - Replaces content between `<!-- specflow:start -->` / `<!-- specflow:end -->`
///   markers if present.
/// - Appends with markers if no section exists yet.
pub fn write_claude_md(
    root: &Path,
    project_name: &str,
    reporter: &dyn Reporter,
) -> anyhow::Result<()> {
    let claude_md = paths::claude_md_path(root);
    let marked_section = build_marked_section(project_name);

    if !claude_md.exists() {
        let content = format!(
            "# CLAUDE.md\n\nProject instructions for {project_name}.\n\n{marked_section}\n"
        );
        io::write_text(&claude_md, &content)?;
        reporter.success("created: CLAUDE.md");
        return Ok(());
    }

    let existing = std::fs::read_to_string(&claude_md)?;

    if existing.contains(SPECFLOW_SECTION_START) {
        match io::splice_between_markers(
            &existing,
            SPECFLOW_SECTION_START,
            SPECFLOW_SECTION_END,
            &marked_section,
        ) {
            Some(updated) => {
                io::write_text(&claude_md, &updated)?;
                reporter.success("updated: CLAUDE.md (spec workflow section refreshed)");
            }
            None => reporter.failure(
                "warning: CLAUDE.md has specflow:start but no specflow:end marker, skipped",
            ),
        }
    } else {
        let updated = format!("{}\n\n{marked_section}\n", existing.trim_end());
        io::write_text(&claude_md, &updated)?;
        reporter.success("updated: CLAUDE.md (spec workflow section added)");
    }

    Ok(())
}

/// Build the full marked section string (start marker + content + end marker).
fn build_marked_section(project_name: &str) -> String {
    let inner = build_section_inner(project_name);
    format!("{SPECFLOW_SECTION_START}{inner}{SPECFLOW_SECTION_END}")
}

fn build_section_inner(project_name: &str) -> String {
    format!(
        "\n\n## Spec Workflow\n\n\
        This project uses a spec-driven workflow. Every feature moves through \
        three documents before implementation starts, all stored under \
        `.claude/specs/<spec-name>/`:\n\n\
        1. `requirements.md` — what to build (user stories, acceptance criteria)\n\
        2. `design.md` — how to build it (architecture, interfaces, data flow)\n\
        3. `tasks.md` — the ordered implementation checklist\n\n\
        ### Commands\n\n\
        - `/spec-create <feature-name>` — start a new spec and drive all three phases\n\
        - `/spec-requirements` — write or revise the requirements document\n\
        - `/spec-design` — write or revise the design document\n\
        - `/spec-tasks` — break the design into an implementation checklist\n\
        - `/spec-execute <task-id> <spec-name>` — implement a single task\n\
        - `/spec-status [spec-name]` — show progress for one spec or all specs\n\
        - `/spec-list` — list all specs\n\n\
        After `tasks.md` is approved, run `specflow generate <spec-name>` to \
        produce one command per task (`/{{spec-name}}-task-{{id}}`) under \
        `.claude/commands/<spec-name>/`. Those files are generated; edit \
        `tasks.md` and regenerate instead of editing them by hand.\n\n\
        ### Rules\n\n\
        - Get explicit approval for each document before moving to the next phase.\n\
        - Implement exactly one task at a time, then stop for review.\n\
        - Mark a finished task by flipping its checkbox to `[x]` in `tasks.md`.\n\n\
        Project: {project_name}\n\n"
    )
}

// ---------------------------------------------------------------------------
// Workflow command content
// ---------------------------------------------------------------------------

const WORKFLOW_COMMANDS: &[(&str, &str)] = &[
    ("spec-create.md", SPEC_CREATE_COMMAND),
    ("spec-requirements.md", SPEC_REQUIREMENTS_COMMAND),
    ("spec-design.md", SPEC_DESIGN_COMMAND),
    ("spec-tasks.md", SPEC_TASKS_COMMAND),
    ("spec-execute.md", SPEC_EXECUTE_COMMAND),
    ("spec-status.md", SPEC_STATUS_COMMAND),
    ("spec-list.md", SPEC_LIST_COMMAND),
];

const DOCUMENT_TEMPLATES: &[(&str, &str)] = &[
    ("requirements-template.md", REQUIREMENTS_TEMPLATE),
    ("design-template.md", DESIGN_TEMPLATE),
    ("tasks-template.md", TASKS_TEMPLATE),
];

const SPEC_CREATE_COMMAND: &str = r#"---
description: Start a new feature spec and drive it through requirements, design, and tasks
argument-hint: <feature-name> [description]
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# spec-create

Create a new feature specification and walk it through the full workflow:
requirements, then design, then tasks. Each phase produces one document and
requires explicit user approval before the next phase starts.

## Steps

### 1. Resolve the feature name

Take `<feature-name>` from $ARGUMENTS. It must be a lowercase, hyphenated
slug (e.g. `user-auth`, `export-csv`). Create the spec directory:

```bash
mkdir -p .claude/specs/<feature-name>
```

### 2. Requirements phase

Follow the `/spec-requirements` playbook to write
`.claude/specs/<feature-name>/requirements.md` from
`.claude/templates/requirements-template.md`. Ask: "Do the requirements
look good? If so, we can move on to the design." Do not continue without
an explicit yes.

### 3. Design phase

Follow the `/spec-design` playbook to write
`.claude/specs/<feature-name>/design.md` from
`.claude/templates/design-template.md`. Ground every design decision in
the approved requirements and in existing code you can reuse. Ask for
approval before continuing.

### 4. Tasks phase

Follow the `/spec-tasks` playbook to write
`.claude/specs/<feature-name>/tasks.md` from
`.claude/templates/tasks-template.md`. Ask for approval.

### 5. Generate task commands

After tasks.md is approved:

```bash
specflow generate <feature-name>
```

This creates one command file per task under
`.claude/commands/<feature-name>/`. Tell the user to restart their Claude
Code session so the new commands are picked up, then summarize: spec name,
task count, and the first task command to run.
"#;

const SPEC_REQUIREMENTS_COMMAND: &str = r#"---
description: Write or revise the requirements document for a spec
argument-hint: [spec-name]
allowed-tools: Read, Write, Edit, Glob, Grep
---

# spec-requirements

Write `.claude/specs/<spec-name>/requirements.md`. If no spec name is given
and exactly one spec exists, use it; otherwise ask.

## Steps

1. Read `.claude/templates/requirements-template.md` and follow its
   structure exactly.
2. Survey the codebase first: find existing functionality the feature
   touches, and note conventions the requirements must respect.
3. Write user stories in the "As a … I want … so that …" form, each with
   numbered acceptance criteria (1.1, 1.2, …) in WHEN/THEN form. The
   numbers are referenced by design and tasks documents, so keep them
   stable once approved.
4. Cover the unhappy paths: invalid input, missing state, permission
   boundaries.
5. Show the document and ask: "Do the requirements look good? If so, we
   can move on to the design." Revise until approved. Do not start the
   design yourself.
"#;

const SPEC_DESIGN_COMMAND: &str = r#"---
description: Write or revise the design document for a spec
argument-hint: [spec-name]
allowed-tools: Read, Write, Edit, Glob, Grep
---

# spec-design

Write `.claude/specs/<spec-name>/design.md` for a spec with approved
requirements.

## Steps

1. Read the approved `requirements.md` first; the design must address
   every acceptance criterion.
2. Read `.claude/templates/design-template.md` and follow its structure.
3. Identify code to reuse: search the project for modules, utilities, and
   patterns the implementation should build on, and name them explicitly
   in a "Code Reuse" section. These references become `_Leverage:_`
   annotations in tasks.md.
4. Describe architecture, components and interfaces, data models, and
   error handling. Use Mermaid diagrams where structure matters.
5. Show the document and ask: "Does the design look good? If so, we can
   move on to the implementation plan." Revise until approved.
"#;

const SPEC_TASKS_COMMAND: &str = r#"---
description: Break an approved design into an ordered implementation checklist
argument-hint: [spec-name]
allowed-tools: Read, Write, Edit, Glob, Grep, Bash
---

# spec-tasks

Write `.claude/specs/<spec-name>/tasks.md` for a spec with an approved
design.

## Task format

Each task is one checklist line, optionally followed by indented detail
and annotation lines:

```
- [ ] 2.1 Add session refresh endpoint
  - Wire the handler into the existing router
  _Leverage: src/auth/session.rs_
  _Requirements: 1.2, 3.1_
```

Rules:

- IDs are hierarchical (`1`, `2`, `2.1`, `2.2`) and must be unique.
- Every task is a concrete coding step sized for a single sitting; no
  "research X" or "think about Y" tasks.
- `_Leverage:_` names existing files the task should build on.
- `_Requirements:_` lists the acceptance criteria the task satisfies;
  every criterion in requirements.md must be covered by at least one task.

## Steps

1. Read the approved requirements.md and design.md.
2. Read `.claude/templates/tasks-template.md` and follow its structure.
3. Write the checklist in dependency order: foundations first, wiring
   last, tests alongside the code they cover.
4. Show the document and ask: "Do the tasks look good?" Revise until
   approved.
5. After approval, run `specflow generate <spec-name>` to create the
   per-task commands, and tell the user to restart their session.
"#;

const SPEC_EXECUTE_COMMAND: &str = r#"---
description: Implement a single task from a spec's checklist
argument-hint: <task-id> <spec-name>
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# spec-execute

Implement exactly one task from `.claude/specs/<spec-name>/tasks.md`.

## Steps

1. Read requirements.md, design.md, and tasks.md for the spec. Locate the
   task with the given id; stop with a clear message if it is missing or
   already checked off.
2. Honor the task's `_Leverage:_` references: read those files and build
   on them instead of writing parallel implementations.
3. Implement only this task. Respect project conventions, and keep the
   change as small as the task allows.
4. Verify: run the project's tests or type checks if they exist.
5. Mark the task complete by changing its checkbox from `[ ]` to `[x]` in
   tasks.md.
6. Stop. Summarize what changed and which task is next, but do not start
   it; the user reviews between tasks.
"#;

const SPEC_STATUS_COMMAND: &str = r#"---
description: Show progress for one spec or all specs
argument-hint: [spec-name]
allowed-tools: Read, Glob, Grep
---

# spec-status

Report workflow progress.

## Steps

1. If a spec name is given, look at `.claude/specs/<spec-name>/`;
   otherwise report on every directory under `.claude/specs/`.
2. For each spec, report phase by the documents present:
   - no requirements.md: requirements phase pending
   - requirements.md only: design phase pending
   - design.md present: tasks phase pending
   - tasks.md present: implementation, with counts from its checkboxes
     (e.g. "4/9 tasks complete"), plus the next unchecked task id.
3. Keep the output short: one line per spec, then detail only for the
   spec the user asked about.
"#;

const SPEC_LIST_COMMAND: &str = r#"---
description: List all specs and their current phase
allowed-tools: Read, Glob, Grep
---

# spec-list

List every directory under `.claude/specs/` with its phase (requirements,
design, tasks, or implementation) and, where tasks.md exists, its
completion count. Sort by name. If there are no specs yet, say so and
point at `/spec-create`.
"#;

// ---------------------------------------------------------------------------
// Document templates
// ---------------------------------------------------------------------------

const REQUIREMENTS_TEMPLATE: &str = r#"# Requirements Document

## Introduction

One or two paragraphs: what this feature is and why it is being built.

## Alignment with Product Vision

How this feature supports the goals of the project.

## Requirements

### Requirement 1

**User Story:** As a [role], I want [feature], so that [benefit]

#### Acceptance Criteria

1.1 WHEN [event] THEN [system] SHALL [response]
1.2 IF [precondition] THEN [system] SHALL [response]

### Requirement 2

**User Story:** As a [role], I want [feature], so that [benefit]

#### Acceptance Criteria

2.1 WHEN [event] THEN [system] SHALL [response]

## Non-Functional Requirements

- Performance:
- Security:
- Reliability:
- Usability:
"#;

const DESIGN_TEMPLATE: &str = r#"# Design Document

## Overview

One or two paragraphs describing the shape of the solution.

## Code Reuse Analysis

Existing code this feature builds on. Name concrete files and modules;
these become `_Leverage:_` annotations in tasks.md.

- `path/to/module` — what it provides and how it is used here

## Architecture

How the pieces fit together. Prefer a Mermaid diagram:

```mermaid
graph TD
    A[Component] --> B[Component]
```

## Components and Interfaces

For each new or changed component:

- **Purpose:**
- **Interface:**
- **Dependencies:**

## Data Models

Structures and their fields, with types.

## Error Handling

Failure scenarios and how each is surfaced to the user.

## Testing Strategy

What gets unit tests, what gets integration tests, and the key scenarios
for each.
"#;

const TASKS_TEMPLATE: &str = r#"# Implementation Plan

- [ ] 1. Set up foundations
  - Describe the concrete change in one or two lines
  _Leverage: path/to/existing/code_
  _Requirements: 1.1_

- [ ] 2. Build the core behavior
  _Requirements: 1.2, 2.1_

- [ ] 2.1 First sub-step
  - Files to create or change
  _Leverage: path/to/existing/code_
  _Requirements: 2.1_

- [ ] 2.2 Second sub-step
  _Requirements: 2.1_

- [ ] 3. Wire into the surface and cover with tests
  _Requirements: 1.1, 1.2, 2.1_
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
