//! Command template rendering.
//!
//! A template is plain text with two recognized placeholders: `%i` for the
//! quoted input file and `%o` for the quoted output path without extension.
//! Only the first occurrence of each placeholder is substituted.

use std::fmt;
use std::path::Path;

pub const INPUT_TOKEN: &str = "%i";
pub const OUTPUT_TOKEN: &str = "%o";

/// User-supplied command template, treated as opaque text until rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
}

impl CommandTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_input_token(&self) -> bool {
        self.raw.contains(INPUT_TOKEN)
    }

    pub fn has_output_token(&self) -> bool {
        self.raw.contains(OUTPUT_TOKEN)
    }

    /// Render the command for one file.
    pub fn render(&self, input_path: &Path, output_dir: &Path, output_base_name: &str) -> String {
        render(&self.raw, input_path, output_dir, output_base_name)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Substitute `%i` then `%o` in `template`.
///
/// `%o` is searched in the string produced by the `%i` substitution, so the
/// output token is looked up after the input path has been spliced in.
pub fn render(
    template: &str,
    input_path: &Path,
    output_dir: &Path,
    output_base_name: &str,
) -> String {
    let escaped_input = quote(&input_path.to_string_lossy());
    let escaped_output = quote(&output_dir.join(output_base_name).to_string_lossy());

    let rendered = template.replacen(INPUT_TOKEN, &escaped_input, 1);
    rendered.replacen(OUTPUT_TOKEN, &escaped_output, 1)
}

/// Wrap `path` in double quotes. Inner quotes are not escaped.
pub fn quote(path: &str) -> String {
    format!("\"{path}\"")
}

/// False when `path` contains a double quote, which `quote` cannot protect.
pub fn is_quotable(path: &str) -> bool {
    !path.contains('"')
}

/// File name after the last separator with the final extension removed.
///
/// `movie.final.mkv` becomes `movie.final`; a name without a dot is returned
/// unchanged.
pub fn output_base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(idx) => name[..idx].to_string(),
        None => name,
    }
}
