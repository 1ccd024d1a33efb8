//! Source loading and the preprocessor seam.
//!
//! Hosts hand the interpreter a [`SourceLoader`] so `include`,
//! `import`, and their evaluating variants never touch the filesystem
//! directly. A loaded source carries its text together with a table of
//! line-start offsets, which the reader uses to tag nodes with line
//! numbers for error reporting.

use std::fs;

use crate::diagnostics::SprigError;

/// Lines starting with this marker are program text in `import` mode.
pub const IMPORT_MARKER: &str = "//%";

/// A source text ready for [`crate::syntax::read_tagged`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSource {
    pub name: String,
    pub text: String,
    /// Char offset of each input line within `text`.
    pub line_starts: Vec<usize>,
}

/// Resolves `include` and `import` requests to source texts.
pub trait SourceLoader {
    /// Loads a program verbatim, line by line.
    fn include(&self, path: &str) -> Result<LoadedSource, SprigError>;

    /// Loads a foreign-language file, keeping only lines that start
    /// with `//%` as program text. Runs of other lines are wrapped in
    /// `『…』` quotes so the program can splice them as string atoms.
    fn import(&self, path: &str) -> Result<LoadedSource, SprigError>;
}

/// The filesystem loader used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    fn slurp(&self, path: &str) -> Result<String, SprigError> {
        fs::read_to_string(path).map_err(|e| SprigError::load(path, e.to_string()))
    }
}

impl SourceLoader for FsLoader {
    fn include(&self, path: &str) -> Result<LoadedSource, SprigError> {
        let raw = self.slurp(path)?;
        let mut text = String::new();
        let mut line_starts = Vec::new();
        let mut len = 0usize;
        for line in raw.lines() {
            line_starts.push(len);
            text.push_str(line);
            text.push('\n');
            len += line.chars().count() + 1;
        }
        Ok(LoadedSource {
            name: path.to_string(),
            text,
            line_starts,
        })
    }

    fn import(&self, path: &str) -> Result<LoadedSource, SprigError> {
        let raw = self.slurp(path)?;
        let mut text = String::new();
        let mut line_starts = Vec::new();
        let mut len = 0usize;
        let mut quoting = false;
        for line in raw.lines() {
            line_starts.push(len);
            if let Some(program) = line.strip_prefix(IMPORT_MARKER) {
                if quoting {
                    quoting = false;
                    text.push('』');
                    len += 1;
                }
                text.push_str(program);
                len += program.chars().count();
            } else {
                if !quoting {
                    quoting = true;
                    text.push_str(" 『");
                    len += 2;
                }
                text.push_str(line);
                text.push('\n');
                len += line.chars().count() + 1;
            }
        }
        if quoting {
            text.push_str("』 ");
        }
        Ok(LoadedSource {
            name: path.to_string(),
            text,
            line_starts,
        })
    }
}

/// Expands macro source text to plain program text. The expander
/// itself lives outside this crate; `unroller` fails over this seam
/// when no implementation is installed.
pub trait Preprocessor {
    fn expand(&self, source: &str) -> Result<String, String>;
}

/// Default preprocessor: refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreprocessor;

impl Preprocessor for NoPreprocessor {
    fn expand(&self, _source: &str) -> Result<String, String> {
        Err("no preprocessor is installed".to_string())
    }
}
