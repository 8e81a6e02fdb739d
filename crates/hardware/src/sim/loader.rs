//! Assembly Loader.
//!
//! This module turns assembly source into a [`Program`]. It performs:
//! 1. **Cleaning:** Strips `#` comments and blank lines, leaving one instruction per entry.
//! 2. **Sections:** Tracks `.text` and `.data`; `.globl`/`.global` are accepted and ignored.
//! 3. **Labels:** Text labels bind to `index * 4`, data labels to the next free data word.
//! 4. **Data Image:** `.word`, `.string`/`.asciz`, `.ascii` and `.space`/`.zero` build
//!    the initial data memory contents.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::{INSTRUCTION_BYTES, LoadError};
use crate::core::arch::SymbolTable;
use crate::isa::decode::parse_immediate;

/// A loaded program: the instruction text, its labels, and the data image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Cleaned instruction lines; line `i` lives at byte address `4 * i`.
    pub lines: Vec<String>,
    /// Text and data labels.
    pub symbols: SymbolTable,
    /// Initial data memory contents, starting at word 0.
    pub data: Vec<i32>,
}

impl Program {
    /// Builds a program from already-cleaned lines and a prepared symbol table.
    pub fn new<I, S>(lines: I, symbols: SymbolTable) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            symbols,
            data: Vec::new(),
        }
    }

    /// Replaces the initial data image.
    #[must_use]
    pub fn with_data(mut self, data: Vec<i32>) -> Self {
        self.data = data;
        self
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if the program holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Text,
    Data,
}

/// Reads and assembles a source file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or any error from [`assemble`].
pub fn load_file(path: impl AsRef<Path>) -> Result<Program, LoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let program = assemble(&source)?;
    debug!(
        path = %path.display(),
        instructions = program.lines.len(),
        data_words = program.data.len(),
        "program loaded"
    );
    Ok(program)
}

/// Assembles source text into a [`Program`].
///
/// Code before any section directive belongs to `.text`.
///
/// # Errors
///
/// Returns a [`LoadError`] naming the 1-based line of the first problem found.
pub fn assemble(source: &str) -> Result<Program, LoadError> {
    let mut program = Program::default();
    let mut section = Section::Text;

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let mut rest = strip_comment(raw).trim();

        while let Some((label, tail)) = split_label(rest) {
            if !is_valid_label(label) {
                return Err(LoadError::InvalidLabel {
                    line,
                    label: label.to_string(),
                });
            }
            let defined = match section {
                Section::Text => program
                    .symbols
                    .define_text(label, program.lines.len() as u32 * INSTRUCTION_BYTES),
                Section::Data => program.symbols.define_data(label, program.data.len() as u32),
            };
            if !defined {
                return Err(LoadError::DuplicateLabel {
                    line,
                    label: label.to_string(),
                });
            }
            rest = tail.trim_start();
        }

        if rest.is_empty() {
            continue;
        }

        if rest.starts_with('.') {
            let (directive, args) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, ""), |(d, a)| (d, a.trim()));
            match directive {
                ".text" => section = Section::Text,
                ".data" => section = Section::Data,
                ".section" => {
                    section = match args.split(',').next().map(str::trim) {
                        Some(".text") => Section::Text,
                        Some(".data" | ".rodata" | ".bss") => Section::Data,
                        _ => {
                            return Err(LoadError::UnknownDirective {
                                line,
                                directive: rest.to_string(),
                            });
                        }
                    };
                }
                ".globl" | ".global" => {}
                ".word" | ".string" | ".asciz" | ".ascii" | ".space" | ".zero" => {
                    if section != Section::Data {
                        return Err(LoadError::DataOutsideSection { line });
                    }
                    emit_data(&mut program.data, directive, args, line)?;
                }
                _ => {
                    return Err(LoadError::UnknownDirective {
                        line,
                        directive: directive.to_string(),
                    });
                }
            }
            continue;
        }

        if section == Section::Data {
            return Err(LoadError::InstructionInData {
                line,
                text: rest.to_string(),
            });
        }
        program.lines.push(rest.to_string());
    }

    Ok(program)
}

fn emit_data(
    data: &mut Vec<i32>,
    directive: &str,
    args: &str,
    line: usize,
) -> Result<(), LoadError> {
    let invalid = || LoadError::InvalidData {
        line,
        literal: args.to_string(),
    };
    match directive {
        ".word" => {
            for literal in args.split([',', ' ', '\t']).filter(|s| !s.is_empty()) {
                let value = parse_immediate(literal).ok_or_else(|| LoadError::InvalidData {
                    line,
                    literal: literal.to_string(),
                })?;
                data.push(value);
            }
            Ok(())
        }
        ".space" | ".zero" => {
            let count = args.parse::<usize>().map_err(|_| invalid())?;
            data.resize(data.len() + count, 0);
            Ok(())
        }
        _ => {
            let bytes = parse_string_literal(args).ok_or_else(invalid)?;
            data.extend(bytes.into_iter().map(i32::from));
            if directive != ".ascii" {
                data.push(0);
            }
            Ok(())
        }
    }
}

/// Parses a double-quoted string with `\n`, `\t`, `\0`, `\\` and `\"` escapes.
fn parse_string_literal(text: &str) -> Option<Vec<u8>> {
    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = Vec::with_capacity(body.len());
    let mut bytes = body.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => out.push(match bytes.next()? {
                b'n' => b'\n',
                b't' => b'\t',
                b'r' => b'\r',
                b'0' => 0,
                b'\\' => b'\\',
                b'"' => b'"',
                _ => return None,
            }),
            b'"' => return None,
            _ => out.push(b),
        }
    }
    Some(out)
}

/// Cuts a line at the first `#` outside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Splits `label: rest` when the text before the first `:` is a single word.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (head, tail) = line.split_once(':')?;
    let head = head.trim();
    if head.is_empty() || head.contains(char::is_whitespace) || head.contains('"') {
        return None;
    }
    Some((head, tail))
}

fn is_valid_label(label: &str) -> bool {
    let mut chars = label.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
