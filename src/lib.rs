use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use globwalk::GlobWalkerBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Stable component type name used in serialized configurations.
pub const CLEANER_TYPE: &str = "doc_cleaner.DocumentCleaner";
/// Registry name of the default (content-addressed) id generator.
pub const DEFAULT_ID_GENERATOR: &str = "doc_cleaner.default_id_generator";
/// Registry name of the keep-original-id generator.
pub const KEEP_ID: &str = "doc_cleaner.keep_id";
/// Marker emitted for id generators that were built from an unnamed closure.
pub const ANONYMOUS_ID_GENERATOR: &str = "<anonymous>";

pub type Meta = BTreeMap<String, serde_json::Value>;

/// A unit of text with metadata and an opaque identity.
///
/// Documents are treated as immutable by the cleaning components: every
/// transformation produces a new `Document` and leaves the input untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub meta: Meta,
}

impl Document {
    /// Build a text document with an empty meta map and a content-addressed id.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_meta(content, Meta::new())
    }

    /// Build a text document; the id is derived from content and meta.
    pub fn with_meta(content: impl Into<String>, meta: Meta) -> Self {
        let content = content.into();
        let id = content_hash_id(Some(&content), &meta);
        Document { id, content: Some(content), meta }
    }

    /// Build a document without text content.
    pub fn empty() -> Self {
        Self::empty_with_meta(Meta::new())
    }

    /// Build a document without text content but with metadata.
    pub fn empty_with_meta(meta: Meta) -> Self {
        let id = content_hash_id(None, &meta);
        Document { id, content: None, meta }
    }
}

/// Derive a document id from its content and metadata.
///
/// Two documents with identical content and metadata share an id; changing
/// either yields a different id. Meta keys are visited in BTreeMap order so
/// the digest is stable regardless of insertion order.
pub fn content_hash_id(content: Option<&str>, meta: &Meta) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    // tag byte keeps "no content" distinct from an empty string
    match content {
        Some(text) => {
            hasher.update([0x01]);
            hasher.update(text.as_bytes());
        }
        None => hasher.update([0x00]),
    }
    hasher.update([0x1f]);
    for (key, value) in meta {
        hasher.update(key.as_bytes());
        hasher.update([0x1e]);
        hasher.update(value.to_string().as_bytes());
        hasher.update([0x1f]);
    }
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}

// Utility to compute sha256 hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}

pub type IdGeneratorFn = Arc<dyn Fn(&Document, &Document) -> String + Send + Sync>;

/// Named id generator: a function from (original document, cleaned document)
/// to the id of the cleaned document. The name is what gets serialized; the
/// function is resolved back through the registry on load.
#[derive(Clone)]
pub struct IdGenerator {
    name: String,
    func: IdGeneratorFn,
}

impl IdGenerator {
    /// Default policy: use the cleaned document's content-addressed id.
    pub fn content_hash() -> Self {
        IdGenerator {
            name: DEFAULT_ID_GENERATOR.to_string(),
            func: Arc::new(|_old: &Document, new: &Document| new.id.clone()),
        }
    }

    /// Keep the original document's id, e.g. when it is referenced elsewhere.
    pub fn keep() -> Self {
        IdGenerator {
            name: KEEP_ID.to_string(),
            func: Arc::new(|old: &Document, _new: &Document| old.id.clone()),
        }
    }

    /// Wrap an unnamed closure. Serializes as `<anonymous>` and cannot be
    /// restored from configuration; use [`register_id_generator`] for that.
    pub fn custom(func: IdGeneratorFn) -> Self {
        IdGenerator { name: ANONYMOUS_ID_GENERATOR.to_string(), func }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generate(&self, original: &Document, cleaned: &Document) -> String {
        (self.func)(original, cleaned)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::content_hash()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").field("name", &self.name).finish()
    }
}

static ID_GENERATORS: Lazy<Mutex<HashMap<String, IdGeneratorFn>>> = Lazy::new(|| {
    let mut map: HashMap<String, IdGeneratorFn> = HashMap::new();
    map.insert(
        DEFAULT_ID_GENERATOR.to_string(),
        Arc::new(|_old: &Document, new: &Document| new.id.clone()) as IdGeneratorFn,
    );
    map.insert(
        KEEP_ID.to_string(),
        Arc::new(|old: &Document, _new: &Document| old.id.clone()) as IdGeneratorFn,
    );
    Mutex::new(map)
});

fn id_generator_registry() -> MutexGuard<'static, HashMap<String, IdGeneratorFn>> {
    match ID_GENERATORS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Register an id generator under a stable name so configurations referring
/// to it can be loaded back. Re-registering a name replaces the function.
pub fn register_id_generator(name: impl Into<String>, func: IdGeneratorFn) {
    id_generator_registry().insert(name.into(), func);
}

/// Resolve a serialized id generator reference back to a callable.
pub fn resolve_id_generator(name: &str) -> Result<IdGenerator, ConfigError> {
    if name == ANONYMOUS_ID_GENERATOR {
        return Err(ConfigError::AnonymousIdGenerator);
    }
    let registry = id_generator_registry();
    match registry.get(name) {
        Some(func) => Ok(IdGenerator { name: name.to_string(), func: Arc::clone(func) }),
        None => Err(ConfigError::UnknownIdGenerator(name.to_string())),
    }
}

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("InvalidInput: expected a list of documents, got {0}")]
    InvalidInput(String),
    #[error("InvalidRegex: {0}")]
    InvalidRegex(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WrongComponentType: expected {expected}, got {got}")]
    WrongType { expected: String, got: String },
    #[error("UnknownIdGenerator: nothing registered under '{0}'")]
    UnknownIdGenerator(String),
    #[error("AnonymousIdGenerator: an unnamed id generator cannot be restored from configuration; register it under a name first")]
    AnonymousIdGenerator,
    #[error("InvalidRegex: {0}")]
    InvalidRegex(String),
}

static EXTRA_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());

/// Drop lines that are empty after trimming and rejoin the rest with a
/// single space.
pub fn remove_empty_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of two or more whitespace characters into one space and
/// trim both ends.
pub fn remove_extra_whitespaces(text: &str) -> String {
    EXTRA_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Delete every occurrence of each literal, in list order. Plain substring
/// deletion, not regex.
pub fn remove_substrings(text: &str, substrings: &[String]) -> String {
    let mut out = text.to_string();
    for needle in substrings {
        if !needle.is_empty() {
            out = out.replace(needle.as_str(), "");
        }
    }
    out
}

/// Delete all matches of the pattern and trim both ends.
pub fn remove_regex_matches(text: &str, pattern: &Regex) -> String {
    pattern.replace_all(text, "").trim().to_string()
}

const PAGE_SEPARATOR: char = '\u{000C}';
const HEADER_FOOTER_SCAN_CHARS: usize = 300;
const MIN_NGRAM: usize = 3;
const MAX_NGRAM: usize = 30;

/// Remove text fragments that repeat on every page, e.g. headers or footers
/// left over from page-wise concatenation. Pages must be separated by the
/// form feed character `\u{000C}`.
pub fn remove_repeated_substrings(text: &str) -> String {
    find_and_remove_header_footer(text, HEADER_FOOTER_SCAN_CHARS, 1, 1)
}

/// Header/footer heuristic: search the first/last `n_chars` characters of the
/// non-ignored pages for the longest common word n-gram and delete it from
/// every page. Exact matches only, so "Copyright 2019 by XXX" is caught but
/// "Page 3 of 4" is not. The first and last pages are ignored as candidates
/// since covers and TOCs often lack the header/footer.
fn find_and_remove_header_footer(
    text: &str,
    n_chars: usize,
    n_first_pages_to_ignore: usize,
    n_last_pages_to_ignore: usize,
) -> String {
    let mut pages: Vec<String> = text.split(PAGE_SEPARATOR).map(|p| p.to_string()).collect();
    let candidate_pages = |pages: &[String]| -> Vec<String> {
        if pages.len() > n_first_pages_to_ignore + n_last_pages_to_ignore {
            pages[n_first_pages_to_ignore..pages.len() - n_last_pages_to_ignore].to_vec()
        } else {
            Vec::new()
        }
    };

    let starts: Vec<String> = candidate_pages(&pages)
        .iter()
        .map(|p| char_prefix(p, n_chars).to_string())
        .collect();
    let header = longest_common_ngram(&starts, MIN_NGRAM, MAX_NGRAM);
    if !header.is_empty() {
        for page in &mut pages {
            *page = page.replace(&header, "");
        }
    }

    // Footer search runs on the already header-stripped pages.
    let ends: Vec<String> = candidate_pages(&pages)
        .iter()
        .map(|p| char_suffix(p, n_chars).to_string())
        .collect();
    let footer = longest_common_ngram(&ends, MIN_NGRAM, MAX_NGRAM);
    if !footer.is_empty() {
        for page in &mut pages {
            *page = page.replace(&footer, "");
        }
    }

    debug!(header = %header, footer = %footer, "removed repeated header and footer");
    pages.join("\u{000C}")
}

/// First `n` characters of `s` (code points, not bytes).
fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Last `n` characters of `s` (code points, not bytes).
fn char_suffix(s: &str, n: usize) -> &str {
    let len = s.chars().count();
    if len <= n {
        return s;
    }
    s.char_indices().nth(len - n).map_or(s, |(idx, _)| &s[idx..])
}

/// Word n-grams of length `n`. Words are split on single spaces while `\n`
/// and `\t` stay attached to the following word, so the original whitespace
/// survives in each candidate.
fn word_ngrams(seq: &str, n: usize) -> Vec<String> {
    let marked = seq.replace('\n', " \n").replace('\t', " \t");
    let words: Vec<&str> = marked.split(' ').collect();
    if n == 0 || words.len() < n {
        return Vec::new();
    }
    (0..=words.len() - n)
        .map(|i| words[i..i + n].join(" ").replace(" \n", "\n").replace(" \t", "\t"))
        .collect()
}

fn all_ngrams(seq: &str, min_ngram: usize, max_ngram: usize) -> HashSet<String> {
    (min_ngram..max_ngram).flat_map(|n| word_ngrams(seq, n)).collect()
}

/// Longest n-gram shared by all non-empty sequences. Ties break
/// lexicographically so the result is deterministic. Returns an empty string
/// when nothing usable is common.
fn longest_common_ngram(sequences: &[String], min_ngram: usize, max_ngram: usize) -> String {
    let mut common: Option<HashSet<String>> = None;
    for seq in sequences.iter().filter(|s| !s.is_empty()) {
        let grams = all_ngrams(seq, min_ngram, max_ngram);
        common = Some(match common {
            Some(acc) => acc.intersection(&grams).cloned().collect(),
            None => grams,
        });
    }
    let longest = common
        .unwrap_or_default()
        .into_iter()
        .max_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        })
        .unwrap_or_default();
    if longest.trim().is_empty() {
        String::new()
    } else {
        longest
    }
}

/// Per-call switches for [`DocumentCleaner::run_with`]. `None` means "use the
/// instance setting"; the instance itself is never mutated.
#[derive(Debug, Clone, Default)]
pub struct CleaningOverrides {
    pub remove_empty_lines: Option<bool>,
    pub remove_extra_whitespaces: Option<bool>,
    pub remove_repeated_substrings: Option<bool>,
    pub remove_substrings: Option<Vec<String>>,
    pub remove_regex: Option<String>,
}

/// Output of the cleaning components: the cleaned documents, in input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanedDocuments {
    pub documents: Vec<Document>,
}

/// Cleans the text in documents: empty lines, extra whitespace, configured
/// substrings and regexes, repeated page headers/footers.
///
/// Each enabled stage is a pure string transformation; stages run in a fixed
/// order (empty lines, whitespace, substrings, regex, repeated substrings).
/// The cleaned document keeps the original meta verbatim and gets its id from
/// the configured [`IdGenerator`].
#[derive(Debug, Clone)]
pub struct DocumentCleaner {
    pub remove_empty_lines: bool,
    pub remove_extra_whitespaces: bool,
    pub remove_repeated_substrings: bool,
    pub remove_substrings: Option<Vec<String>>,
    pub remove_regex: Option<String>,
    pub id_generator: IdGenerator,
}

impl Default for DocumentCleaner {
    fn default() -> Self {
        DocumentCleaner {
            remove_empty_lines: true,
            remove_extra_whitespaces: true,
            remove_repeated_substrings: false,
            remove_substrings: None,
            remove_regex: None,
            id_generator: IdGenerator::content_hash(),
        }
    }
}

impl DocumentCleaner {
    /// Clean the documents with the instance configuration.
    pub fn run(&self, documents: &[Document]) -> Result<CleanedDocuments, CleanError> {
        self.run_with(documents, &CleaningOverrides::default())
    }

    /// Clean the documents, overriding individual stage switches for this
    /// call only. Fails before any document is touched if the effective
    /// regex does not compile.
    pub fn run_with(
        &self,
        documents: &[Document],
        overrides: &CleaningOverrides,
    ) -> Result<CleanedDocuments, CleanError> {
        let remove_empty = overrides.remove_empty_lines.unwrap_or(self.remove_empty_lines);
        let remove_whitespace = overrides
            .remove_extra_whitespaces
            .unwrap_or(self.remove_extra_whitespaces);
        let remove_repeated = overrides
            .remove_repeated_substrings
            .unwrap_or(self.remove_repeated_substrings);
        let substrings = overrides
            .remove_substrings
            .as_ref()
            .or(self.remove_substrings.as_ref());
        let pattern = overrides.remove_regex.as_deref().or(self.remove_regex.as_deref());
        let compiled = match pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| CleanError::InvalidRegex(e.to_string()))?),
            None => None,
        };

        let mut cleaned = Vec::with_capacity(documents.len());
        for doc in documents {
            let Some(content) = doc.content.as_deref() else {
                warn!(
                    document_id = %doc.id,
                    "DocumentCleaner only cleans text documents; passing the document through unchanged"
                );
                cleaned.push(doc.clone());
                continue;
            };

            let mut text = content.to_string();
            if remove_empty {
                text = remove_empty_lines(&text);
            }
            if remove_whitespace {
                text = remove_extra_whitespaces(&text);
            }
            if let Some(substrings) = substrings {
                text = remove_substrings(&text, substrings);
            }
            if let Some(regex) = compiled.as_ref() {
                text = remove_regex_matches(&text, regex);
            }
            if remove_repeated {
                text = remove_repeated_substrings(&text);
            }

            let mut new_doc = Document::with_meta(text, doc.meta.clone());
            new_doc.id = self.id_generator.generate(doc, &new_doc);
            cleaned.push(new_doc);
        }

        Ok(CleanedDocuments { documents: cleaned })
    }

    /// Framework boundary: accept the wire form and enforce the
    /// list-of-documents contract before cleaning.
    pub fn run_value(&self, input: &serde_json::Value) -> Result<CleanedDocuments, CleanError> {
        self.run_value_with(input, &CleaningOverrides::default())
    }

    pub fn run_value_with(
        &self,
        input: &serde_json::Value,
        overrides: &CleaningOverrides,
    ) -> Result<CleanedDocuments, CleanError> {
        let documents = parse_documents(input)?;
        self.run_with(&documents, overrides)
    }

    /// Serialize this component to its configuration form.
    pub fn to_config(&self) -> CleanerConfig {
        CleanerConfig {
            type_name: CLEANER_TYPE.to_string(),
            init_parameters: CleanerParams {
                remove_empty_lines: self.remove_empty_lines,
                remove_extra_whitespaces: self.remove_extra_whitespaces,
                remove_repeated_substrings: self.remove_repeated_substrings,
                remove_substrings: self.remove_substrings.clone(),
                remove_regex: self.remove_regex.clone(),
                id_generator: self.id_generator.name().to_string(),
            },
        }
    }

    /// Rebuild a cleaner from its configuration form, resolving the id
    /// generator reference through the registry.
    pub fn from_config(config: &CleanerConfig) -> Result<Self, ConfigError> {
        if config.type_name != CLEANER_TYPE {
            return Err(ConfigError::WrongType {
                expected: CLEANER_TYPE.to_string(),
                got: config.type_name.clone(),
            });
        }
        Self::from_params(&config.init_parameters)
    }

    pub fn from_params(params: &CleanerParams) -> Result<Self, ConfigError> {
        if let Some(pattern) = &params.remove_regex {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex(e.to_string()))?;
        }
        let id_generator = resolve_id_generator(&params.id_generator)?;
        Ok(DocumentCleaner {
            remove_empty_lines: params.remove_empty_lines,
            remove_extra_whitespaces: params.remove_extra_whitespaces,
            remove_repeated_substrings: params.remove_repeated_substrings,
            remove_substrings: params.remove_substrings.clone(),
            remove_regex: params.remove_regex.clone(),
            id_generator,
        })
    }
}

fn parse_documents(input: &serde_json::Value) -> Result<Vec<Document>, CleanError> {
    let items = match input {
        serde_json::Value::Array(items) => items,
        other => return Err(CleanError::InvalidInput(json_kind(other).to_string())),
    };
    let mut documents = Vec::with_capacity(items.len());
    for item in items {
        let mut doc: Document = serde_json::from_value(item.clone()).map_err(|e| {
            CleanError::InvalidInput(format!("an array with a non-document element ({})", e))
        })?;
        if doc.id.is_empty() {
            doc.id = content_hash_id(doc.content.as_deref(), &doc.meta);
        }
        documents.push(doc);
    }
    Ok(documents)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a single object",
    }
}

/// Drops documents without text content. Documents whose content is an empty
/// string are kept.
#[derive(Debug, Clone, Default)]
pub struct EmptyDocumentRemover;

impl EmptyDocumentRemover {
    pub fn run(&self, documents: &[Document]) -> CleanedDocuments {
        CleanedDocuments {
            documents: documents
                .iter()
                .filter(|doc| doc.content.is_some())
                .cloned()
                .collect(),
        }
    }

    pub fn run_value(&self, input: &serde_json::Value) -> Result<CleanedDocuments, CleanError> {
        let documents = parse_documents(input)?;
        Ok(self.run(&documents))
    }
}

/// Serialized component form: type name plus all construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanerConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    pub init_parameters: CleanerParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanerParams {
    #[serde(default = "default_true")]
    pub remove_empty_lines: bool,
    #[serde(default = "default_true")]
    pub remove_extra_whitespaces: bool,
    #[serde(default)]
    pub remove_repeated_substrings: bool,
    #[serde(default)]
    pub remove_substrings: Option<Vec<String>>,
    #[serde(default)]
    pub remove_regex: Option<String>,
    #[serde(default = "default_id_generator_name")]
    pub id_generator: String,
}

fn default_true() -> bool {
    true
}

fn default_id_generator_name() -> String {
    DEFAULT_ID_GENERATOR.to_string()
}

impl Default for CleanerParams {
    fn default() -> Self {
        CleanerParams {
            remove_empty_lines: true,
            remove_extra_whitespaces: true,
            remove_repeated_substrings: false,
            remove_substrings: None,
            remove_regex: None,
            id_generator: default_id_generator_name(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Read(String),
    #[error("Failed to parse settings: {0}")]
    Parse(String),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub id: String,
    #[serde(default)]
    pub inputs: Option<SettingsInputs>,
    #[serde(default)]
    pub outputs: Option<SettingsOutputs>,
    #[serde(default)]
    pub cleaner: Option<CleanerParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsInputs {
    pub glob: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsOutputs {
    pub dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { id: "default".to_string(), inputs: None, outputs: None, cleaner: None }
    }
}

impl Settings {
    pub fn input_glob(&self) -> String {
        self.inputs
            .as_ref()
            .and_then(|i| i.glob.clone())
            .unwrap_or_else(|| "./input/**/*.json".to_string())
    }

    pub fn output_dir(&self) -> String {
        self.outputs
            .as_ref()
            .and_then(|o| o.dir.clone())
            .unwrap_or_else(|| "./output".to_string())
    }

    pub fn cleaner_params(&self) -> CleanerParams {
        self.cleaner.clone().unwrap_or_default()
    }
}

/// Minimal validation for the CLI settings file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Read(e.to_string()))?;
    let settings: Settings =
        serde_yaml::from_str(&raw).map_err(|e| SettingsError::Parse(e.to_string()))?;
    if settings.id.trim().is_empty() {
        return Err(SettingsError::Invalid("missing id".into()));
    }
    Ok(settings)
}

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("NoFilesFound")]
    NoFilesFound { guidance: String },
}

/// Enumerate document JSON files using a glob pattern (e.g. "./input/**/*.json").
/// Returns a sorted list of paths.
pub fn enumerate_inputs(glob_pattern: &str) -> Result<Vec<PathBuf>, EnumerateError> {
    let root = if Path::new(glob_pattern).is_absolute() { "/" } else { "." };
    let mut pat = glob_pattern.to_string();
    if pat.starts_with("./") {
        pat = pat.trim_start_matches("./").to_string();
    }
    let mut paths: Vec<PathBuf> = GlobWalkerBuilder::from_patterns(root, &[pat.as_str()])
        .case_insensitive(false)
        .follow_links(false)
        .max_depth(usize::MAX)
        .build()
        .map_err(|_| EnumerateError::NoFilesFound { guidance: input_guidance() })?
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .collect();

    paths.sort();
    paths.retain(|p| p.is_file());

    if paths.is_empty() {
        return Err(EnumerateError::NoFilesFound { guidance: input_guidance() });
    }

    Ok(paths)
}

fn input_guidance() -> String {
    let guide = r#"No document files matched ./input/**/*.json
Suggested layout:
  ./input/corpus-a/...
  ./input/corpus-b/...
Each file holds a JSON array of documents, e.g. ./input/corpus-a/batch-001.json"#;
    guide.to_string()
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPaths {
    pub docs_path: String,
    pub report_path: String,
}

/// Atomically write cleaned documents and a run report into outdir with the
/// given file stem.
pub fn emit_cleaned(
    cleaned: &CleanedDocuments,
    report: &serde_json::Value,
    outdir: &str,
    stem: &str,
) -> Result<EmitPaths, EmitError> {
    std::fs::create_dir_all(outdir).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let docs_path = Path::new(outdir).join(format!("{}.cleaned.json", stem));
    let report_path = Path::new(outdir).join(format!("{}.report.json", stem));

    // Write temp files then rename
    let pid = std::process::id();
    let docs_tmp = docs_path.with_extension(format!("json.tmp.{}", pid));
    let report_tmp = report_path.with_extension(format!("json.tmp.{}", pid));

    let docs_bytes = serde_json::to_vec_pretty(&cleaned.documents)
        .map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::write(&docs_tmp, docs_bytes).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let report_bytes =
        serde_json::to_vec_pretty(report).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::write(&report_tmp, report_bytes).map_err(|e| EmitError::WriteFailed(e.to_string()))?;

    std::fs::rename(&docs_tmp, &docs_path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::rename(&report_tmp, &report_path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;

    Ok(EmitPaths {
        docs_path: docs_path.to_string_lossy().to_string(),
        report_path: report_path.to_string_lossy().to_string(),
    })
}
