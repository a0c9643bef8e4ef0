use anyhow::{Context as AnyhowContext, Result};
use ctxlog_engine::{
    apply_insertions, is_duplicate_nearby, selection_candidates, strip_tagged_lines, CodeContext,
    ContextAnalyzer, ContextSet, Insertion, Language, LogConfig, LogRenderer, Position,
    SelectionCandidate,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config files picked up from the working directory when `--config` is absent
pub const CONFIG_FILE_NAMES: [&str; 2] = [".ctxlog.json", ".ctxlog.toml"];

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("No loggable scope at {line}:{column}")]
    NoContext { line: usize, column: usize },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("logTag is empty; tagged statements cannot be found")]
    MissingLogTag,
}

/// A 1-based cursor as typed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 0-based engine position
    pub fn position(self) -> Position {
        Position::new(self.line.saturating_sub(1), self.column.saturating_sub(1))
    }
}

/// Parse `LINE` or `LINE:COLUMN`, both 1-based
pub fn parse_cursor(raw: &str) -> std::result::Result<Cursor, String> {
    let (line, column) = match raw.split_once(':') {
        Some((line, column)) => (line, Some(column)),
        None => (raw, None),
    };
    let line: usize = line
        .trim()
        .parse()
        .map_err(|_| format!("invalid line in `{raw}`"))?;
    let column: usize = match column {
        Some(column) => column
            .trim()
            .parse()
            .map_err(|_| format!("invalid column in `{raw}`"))?,
        None => 1,
    };
    if line == 0 || column == 0 {
        return Err(format!("cursor `{raw}` is 1-based"));
    }
    Ok(Cursor::new(line, column))
}

/// Explicit file, then a dotfile in the working directory, then the defaults
pub fn load_config(explicit: Option<&Path>, fallback: LogConfig) -> Result<LogConfig> {
    if let Some(path) = explicit {
        return LogConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    for name in CONFIG_FILE_NAMES {
        let path = Path::new(name);
        if path.is_file() {
            log::debug!("using config {name}");
            return LogConfig::from_path(path)
                .with_context(|| format!("failed to load config {name}"));
        }
    }
    Ok(fallback)
}

/// Settings shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: LogConfig,
    /// Grammar forced for every file instead of detecting it from the extension
    pub language: Option<Language>,
}

/// Source file opened for analysis
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Value substituted for `${fileName}`
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn analyzer(&self, session: &Session) -> Result<ContextAnalyzer> {
        let language = session
            .language
            .unwrap_or_else(|| Language::from_path(&self.path));
        Ok(ContextAnalyzer::new(session.config.clone(), language)?)
    }
}

#[derive(Debug, Serialize)]
pub struct ContextsOutput {
    pub file: String,
    pub language: &'static str,
    pub contexts: ContextSet,
}

#[derive(Debug, Serialize)]
pub struct AtOutput {
    pub file: String,
    pub cursor: Cursor,
    pub context: Option<CodeContext>,
    /// Enclosing scope names, nearest first
    pub parents: Vec<String>,
    pub candidates: Vec<SelectionCandidate>,
}

#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub file: String,
    pub context: String,
    pub position: Position,
    pub statement: String,
}

/// Where `insert` places statements
#[derive(Debug, Clone, Copy)]
pub enum InsertTarget<'a> {
    Cursors(&'a [Cursor]),
    AllScopes,
}

#[derive(Debug, Serialize)]
pub struct PlannedInsertion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    pub context: String,
    pub position: Position,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutput {
    pub file: String,
    pub insertions: Vec<PlannedInsertion>,
    /// Statements already present near their insertion point
    pub duplicates: Vec<PlannedInsertion>,
    /// Cursors outside every loggable scope
    pub skipped: Vec<Cursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_added: Option<String>,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CleanOutput {
    pub file: String,
    /// 1-based lines removed
    pub removed: Vec<usize>,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestOutput {
    pub file: String,
    pub line: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WrapOutput {
    pub statement: String,
}

#[derive(Debug, Serialize)]
pub struct ScannedFile {
    pub path: String,
    pub language: &'static str,
    pub contexts: ContextSet,
}

#[derive(Debug, Serialize)]
pub struct ScanFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ScanOutput {
    pub root: String,
    pub files: Vec<ScannedFile>,
    pub errors: Vec<ScanFailure>,
}

/// Result of one subcommand
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Contexts(ContextsOutput),
    At(AtOutput),
    Render(RenderOutput),
    Insert(InsertOutput),
    Clean(CleanOutput),
    Suggest(SuggestOutput),
    Wrap(WrapOutput),
    Scan(ScanOutput),
}

pub fn run_contexts(path: &Path, session: &Session) -> Result<Output> {
    let source = SourceFile::read(path)?;
    let mut analyzer = source.analyzer(session)?;
    let contexts = analyzer.all_contexts_in_file(&source.text)?;
    log::info!("{}: {} loggable scopes", path.display(), contexts.len());
    Ok(Output::Contexts(ContextsOutput {
        file: path.display().to_string(),
        language: analyzer.language().as_str(),
        contexts,
    }))
}

pub fn run_at(path: &Path, cursor: Cursor, session: &Session) -> Result<Output> {
    let source = SourceFile::read(path)?;
    let found = source
        .analyzer(session)?
        .context_at_cursor(&source.text, cursor.position())?;

    let (parents, candidates) = match &found {
        Some(found) => (
            found.ancestors().map(|ctx| ctx.name.clone()).collect(),
            selection_candidates(found),
        ),
        None => (Vec::new(), Vec::new()),
    };
    Ok(Output::At(AtOutput {
        file: path.display().to_string(),
        cursor,
        context: found.map(|found| found.into_context()),
        parents,
        candidates,
    }))
}

pub fn run_render(
    path: &Path,
    cursor: Cursor,
    select: &[String],
    session: &Session,
) -> Result<Output> {
    let source = SourceFile::read(path)?;
    let found = source
        .analyzer(session)?
        .context_at_cursor(&source.text, cursor.position())?
        .ok_or(RequestError::NoContext {
            line: cursor.line,
            column: cursor.column,
        })?;

    let ctx = found.context();
    let selected = (!select.is_empty()).then_some(select);
    let statement = LogRenderer::new(&session.config).render(ctx, &source.file_name(), selected);
    Ok(Output::Render(RenderOutput {
        file: path.display().to_string(),
        context: ctx.name.clone(),
        position: ctx.insert_position,
        statement,
    }))
}

pub fn run_insert(
    path: &Path,
    target: InsertTarget<'_>,
    select: &[String],
    write: bool,
    session: &Session,
) -> Result<Output> {
    let source = SourceFile::read(path)?;
    let mut analyzer = source.analyzer(session)?;
    let renderer = LogRenderer::new(&session.config);
    let file_name = source.file_name();
    let selected = (!select.is_empty()).then_some(select);

    let mut planned = Vec::new();
    let mut skipped = Vec::new();
    match target {
        InsertTarget::Cursors(cursors) => {
            for &cursor in cursors {
                match analyzer.context_at_cursor(&source.text, cursor.position())? {
                    Some(found) => {
                        let ctx = found.context();
                        planned.push(PlannedInsertion {
                            cursor: Some(cursor),
                            context: ctx.name.clone(),
                            position: ctx.insert_position,
                            text: renderer.render(ctx, &file_name, selected),
                        });
                    }
                    None => {
                        log::warn!("no loggable scope at {}:{}", cursor.line, cursor.column);
                        skipped.push(cursor);
                    }
                }
            }
            if planned.is_empty() {
                let first = cursors.first().copied().unwrap_or(Cursor::new(1, 1));
                return Err(RequestError::NoContext {
                    line: first.line,
                    column: first.column,
                }
                .into());
            }
        }
        InsertTarget::AllScopes => {
            for ctx in &analyzer.all_contexts_in_file(&source.text)? {
                planned.push(PlannedInsertion {
                    cursor: None,
                    context: ctx.name.clone(),
                    position: ctx.insert_position,
                    text: renderer.render(ctx, &file_name, None),
                });
            }
            if planned.is_empty() {
                log::info!("{}: no loggable scopes", path.display());
            }
        }
    }

    let (insertions, duplicates): (Vec<_>, Vec<_>) = planned
        .into_iter()
        .partition(|plan| !is_duplicate_nearby(&source.text, plan.position, &plan.text));
    for plan in &duplicates {
        log::warn!("skipping duplicate statement in {}", plan.context);
    }

    let import_added = if insertions.is_empty() {
        None
    } else {
        session
            .config
            .missing_import(&source.text)
            .map(str::to_string)
    };

    let mut edits = Vec::with_capacity(insertions.len() + 1);
    if let Some(import) = &import_added {
        edits.push(Insertion::new(Position::new(0, 0), import.clone()));
    }
    edits.extend(
        insertions
            .iter()
            .map(|plan| Insertion::new(plan.position, plan.text.clone())),
    );
    let updated = apply_insertions(&source.text, &edits)?;

    let written = write && !edits.is_empty();
    let content = if write {
        if written {
            fs::write(path, &updated)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {} statements to {}", insertions.len(), path.display());
        }
        None
    } else {
        Some(updated)
    };

    Ok(Output::Insert(InsertOutput {
        file: path.display().to_string(),
        insertions,
        duplicates,
        skipped,
        import_added,
        written,
        content,
    }))
}

/// Remove statements carrying the configured `logTag`
pub fn run_clean(path: &Path, write: bool, session: &Session) -> Result<Output> {
    let tag = session.config.log_tag.trim();
    if tag.is_empty() {
        return Err(RequestError::MissingLogTag.into());
    }

    let source = SourceFile::read(path)?;
    let cleaned = strip_tagged_lines(&source.text, tag);
    let removed: Vec<usize> = cleaned.removed.iter().map(|line| line + 1).collect();
    if removed.is_empty() {
        log::info!("{}: no tagged statements", path.display());
    }

    let written = write && !removed.is_empty();
    let content = if write {
        if written {
            fs::write(path, &cleaned.text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("removed {} lines from {}", removed.len(), path.display());
        }
        None
    } else {
        Some(cleaned.text)
    };

    Ok(Output::Clean(CleanOutput {
        file: path.display().to_string(),
        removed,
        written,
        content,
    }))
}

pub fn run_suggest(path: &Path, line: usize, session: &Session) -> Result<Output> {
    let source = SourceFile::read(path)?;
    let names = source
        .analyzer(session)?
        .suggestions_at_line(&source.text, line.saturating_sub(1))?;
    Ok(Output::Suggest(SuggestOutput {
        file: path.display().to_string(),
        line,
        names,
    }))
}

pub fn run_wrap(text: &str, session: &Session) -> Output {
    Output::Wrap(WrapOutput {
        statement: LogRenderer::new(&session.config).wrap_selection(text),
    })
}

/// Analyze every supported file under `root`, honouring ignore files
pub fn run_scan(root: &Path, session: &Session) -> Result<Output> {
    if !root.is_dir() {
        return Err(RequestError::NotADirectory(root.to_path_buf()).into());
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for entry in ignore::WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_some_and(|kind| kind.is_file())
            || !Language::is_supported_path(path)
        {
            continue;
        }

        match scan_file(path, session) {
            Ok(scanned) => files.push(scanned),
            Err(err) => {
                log::warn!("{}: {err:#}", path.display());
                errors.push(ScanFailure {
                    path: path.display().to_string(),
                    message: format!("{err:#}"),
                });
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    errors.sort_by(|a, b| a.path.cmp(&b.path));
    log::info!(
        "scanned {} files ({} failed) under {}",
        files.len() + errors.len(),
        errors.len(),
        root.display()
    );
    Ok(Output::Scan(ScanOutput {
        root: root.display().to_string(),
        files,
        errors,
    }))
}

fn scan_file(path: &Path, session: &Session) -> Result<ScannedFile> {
    let source = SourceFile::read(path)?;
    let mut analyzer = source.analyzer(session)?;
    let contexts = analyzer.all_contexts_in_file(&source.text)?;
    Ok(ScannedFile {
        path: path.display().to_string(),
        language: analyzer.language().as_str(),
        contexts,
    })
}
