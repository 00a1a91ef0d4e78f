//! Reader for the parts of `go.mod` that replace pinning cares about.
//!
//! Only `module`, `require` and `replace` directives are interpreted; every
//! other directive (`go`, `exclude`, `retract`, `toolchain`, ...) is skipped.

use serde::{Deserialize, Serialize};

/// A `path version` pair from a require or replace directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    /// Module import path (or a local directory for replacement targets).
    pub path: String,
    /// Version; empty when the directive carries none.
    pub version: String,
}

/// A `require` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Require {
    /// The required module.
    pub module: ModuleReference,
    /// Whether the line is marked `// indirect`.
    pub indirect: bool,
}

/// A `replace old [v] => new [v]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replace {
    /// Module being replaced.
    pub old: ModuleReference,
    /// Replacement module.
    pub new: ModuleReference,
}

/// The interpreted contents of a `go.mod` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// The `module` path, when declared.
    pub module: Option<String>,
    /// Require directives in file order.
    pub require: Vec<Require>,
    /// Replace directives in file order.
    pub replace: Vec<Replace>,
}

/// A syntax error with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{line}: {message}")]
pub struct ParseError {
    /// File name used in the message.
    pub file: String,
    /// Line where the problem was found.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Require,
    Replace,
    Other,
}

impl Manifest {
    /// Parses `contents`; `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for malformed require/replace lines or an
    /// unterminated block.
    pub fn parse(file: &str, contents: &str) -> Result<Self, ParseError> {
        let mut manifest = Self::default();
        let mut block: Option<(Block, usize)> = None;

        for (idx, raw) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let err = |message: String| ParseError { file: file.to_string(), line: line_no, message };
            let (code, comment) = split_comment(raw);
            let code = code.trim();
            if code.is_empty() {
                continue;
            }

            if let Some((kind, _)) = block {
                if code == ")" {
                    block = None;
                    continue;
                }
                manifest.apply(kind, code, comment).map_err(err)?;
                continue;
            }

            let (verb, rest) = code.split_once(char::is_whitespace).unwrap_or((code, ""));
            let rest = rest.trim();
            let kind = match verb {
                "require" => Block::Require,
                "replace" => Block::Replace,
                "module" => {
                    manifest.module = Some(unquote(rest).to_string());
                    continue;
                }
                _ => Block::Other,
            };
            if rest == "(" {
                block = Some((kind, line_no));
            } else {
                manifest.apply(kind, rest, comment).map_err(err)?;
            }
        }

        if let Some((_, opened)) = block {
            return Err(ParseError {
                file: file.to_string(),
                line: opened,
                message: "unterminated block".to_string(),
            });
        }
        Ok(manifest)
    }

    fn apply(&mut self, kind: Block, entry: &str, comment: Option<&str>) -> Result<(), String> {
        match kind {
            Block::Require => {
                let fields = fields(entry);
                let [path, version] = fields.as_slice() else {
                    return Err(format!("usage: require module/path v1.2.3, got {entry:?}"));
                };
                let indirect = comment.is_some_and(|c| c.trim() == "indirect");
                self.require.push(Require {
                    module: ModuleReference { path: path.clone(), version: version.clone() },
                    indirect,
                });
            }
            Block::Replace => {
                let (old, new) = entry
                    .split_once("=>")
                    .ok_or_else(|| format!("replace directive without =>: {entry:?}"))?;
                self.replace.push(Replace {
                    old: reference(old).ok_or_else(|| format!("invalid replace source {old:?}"))?,
                    new: reference(new).ok_or_else(|| format!("invalid replace target {new:?}"))?,
                });
            }
            Block::Other => {}
        }
        Ok(())
    }

    /// Returns the replace entry whose old path is `path`.
    #[must_use]
    pub fn replacement_for(&self, path: &str) -> Option<&Replace> {
        self.replace.iter().find(|r| r.old.path == path)
    }
}

fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.find("//") {
        Some(pos) => (&line[..pos], Some(&line[pos + 2..])),
        None => (line, None),
    }
}

fn unquote(field: &str) -> &str {
    field.strip_prefix('"').and_then(|f| f.strip_suffix('"')).unwrap_or(field)
}

fn fields(entry: &str) -> Vec<String> {
    entry.split_whitespace().map(|f| unquote(f).to_string()).collect()
}

fn reference(side: &str) -> Option<ModuleReference> {
    match fields(side).as_slice() {
        [path] => Some(ModuleReference { path: path.clone(), version: String::new() }),
        [path, version] => Some(ModuleReference { path: path.clone(), version: version.clone() }),
        _ => None,
    }
}
