use crate::command::{
    AtOutput, CleanOutput, ContextsOutput, InsertOutput, Output, RenderOutput, ScanOutput,
    SuggestOutput,
};
use ctxlog_engine::{CodeContext, ContextSet, Position};

/// Plain-text rendering of a command result
pub fn render_text(output: &Output) -> String {
    match output {
        Output::Contexts(out) => render_contexts(out),
        Output::At(out) => render_at(out),
        Output::Render(out) => render_statement(out),
        Output::Insert(out) => render_insert(out),
        Output::Clean(out) => render_clean(out),
        Output::Suggest(out) => render_suggest(out),
        Output::Wrap(out) => format!("{}\n", out.statement),
        Output::Scan(out) => render_scan(out),
    }
}

fn render_contexts(out: &ContextsOutput) -> String {
    let mut text = format!(
        "{} ({}): {} loggable {}\n",
        out.file,
        out.language,
        out.contexts.len(),
        plural(out.contexts.len(), "scope", "scopes")
    );
    for ctx in &out.contexts {
        push_context(&mut text, ctx, &out.contexts, "  ");
    }
    text
}

fn render_at(out: &AtOutput) -> String {
    let Some(ctx) = &out.context else {
        return format!(
            "{}:{}:{}: no loggable scope\n",
            out.file, out.cursor.line, out.cursor.column
        );
    };

    let mut text = format!("{}:{}:{}\n", out.file, out.cursor.line, out.cursor.column);
    push_summary(&mut text, ctx, "  ");
    if !out.parents.is_empty() {
        text.push_str(&format!("  parents: {}\n", out.parents.join(" > ")));
    }
    push_buckets(&mut text, ctx, "    ");
    if !out.candidates.is_empty() {
        text.push_str("  candidates:\n");
        for candidate in &out.candidates {
            text.push_str(&format!("    - {}\n", candidate.label));
        }
    }
    text
}

fn render_statement(out: &RenderOutput) -> String {
    format!("{}\n", out.statement)
}

fn render_insert(out: &InsertOutput) -> String {
    if let Some(content) = &out.content {
        return content.clone();
    }
    let mut text = format!(
        "Inserted {} {} into {}\n",
        out.insertions.len(),
        plural(out.insertions.len(), "statement", "statements"),
        out.file
    );
    if let Some(import) = &out.import_added {
        text.push_str(&format!("  added `{import}`\n"));
    }
    for plan in &out.insertions {
        text.push_str(&format!(
            "  {} at {}\n",
            plan.context,
            one_based(plan.position)
        ));
    }
    for plan in &out.duplicates {
        text.push_str(&format!(
            "  skipped {} (already logged near {})\n",
            plan.context,
            one_based(plan.position)
        ));
    }
    for cursor in &out.skipped {
        text.push_str(&format!(
            "  skipped {}:{} (no loggable scope)\n",
            cursor.line, cursor.column
        ));
    }
    text
}

fn render_clean(out: &CleanOutput) -> String {
    if let Some(content) = &out.content {
        return content.clone();
    }
    let mut text = format!(
        "Removed {} {} from {}\n",
        out.removed.len(),
        plural(out.removed.len(), "line", "lines"),
        out.file
    );
    if !out.removed.is_empty() {
        let lines: Vec<String> = out.removed.iter().map(usize::to_string).collect();
        text.push_str(&format!("  lines {}\n", lines.join(", ")));
    }
    text
}

fn render_suggest(out: &SuggestOutput) -> String {
    out.names.iter().map(|name| format!("{name}\n")).collect()
}

fn render_scan(out: &ScanOutput) -> String {
    let mut text = String::new();
    let mut total = 0;
    let mut components = 0;
    for file in &out.files {
        total += file.contexts.len();
        components += file.contexts.iter().filter(|ctx| ctx.is_component()).count();
        text.push_str(&format!(
            "{} ({}): {} {}\n",
            file.path,
            file.language,
            file.contexts.len(),
            plural(file.contexts.len(), "scope", "scopes")
        ));
        for ctx in &file.contexts {
            text.push_str("  ");
            push_summary(&mut text, ctx, "");
        }
    }
    for failure in &out.errors {
        text.push_str(&format!("{}: error: {}\n", failure.path, failure.message));
    }
    text.push_str(&format!(
        "\n{} files, {} scopes ({} {}), {} errors\n",
        out.files.len(),
        total,
        components,
        plural(components, "component", "components"),
        out.errors.len()
    ));
    text
}

fn push_context(text: &mut String, ctx: &CodeContext, contexts: &ContextSet, indent: &str) {
    push_summary(text, ctx, indent);
    if let Some(parent) = contexts.parent(ctx) {
        text.push_str(&format!("{indent}  parent: {}\n", parent.name));
    }
    push_buckets(text, ctx, &format!("{indent}  "));
}

fn push_summary(text: &mut String, ctx: &CodeContext, indent: &str) {
    text.push_str(&format!(
        "{indent}{} ({}) lines {}-{}, insert at {}\n",
        ctx.name,
        ctx.kind.as_str(),
        ctx.span.start.line + 1,
        ctx.span.end.line + 1,
        one_based(ctx.insert_position)
    ));
}

fn push_buckets(text: &mut String, ctx: &CodeContext, indent: &str) {
    if !ctx.args.is_empty() {
        text.push_str(&format!("{indent}args: {}\n", ctx.args.join(", ")));
    }
    for (bucket, names) in ctx.variables.iter() {
        if !names.is_empty() {
            text.push_str(&format!("{indent}{}: {}\n", bucket.as_str(), names.join(", ")));
        }
    }
}

fn one_based(position: Position) -> String {
    format!("{}:{}", position.line + 1, position.column + 1)
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
