//! Extension-based exclusion of files from command execution.

const DELIMITERS: [char; 3] = [' ', ',', ';'];

/// Parsed exclusion list: lower-cased extensions without leading dots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    extensions: Vec<String>,
}

impl ExclusionList {
    /// Parse a free-text list such as `".mp4, MKV;txt"`.
    ///
    /// Tokens are separated by any run of spaces, commas or semicolons. A
    /// single leading dot is stripped and matching is case-insensitive.
    pub fn parse(spec: &str) -> Self {
        let extensions = spec
            .split(DELIMITERS)
            .map(|token| token.strip_prefix('.').unwrap_or(token))
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { extensions }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `filename` carries one of the listed extensions.
    pub fn matches(&self, filename: &str) -> bool {
        let Some(extension) = extension_of(filename) else {
            return false;
        };
        self.extensions.iter().any(|excluded| *excluded == extension)
    }
}

/// Decide whether `filename` is skipped given a raw exclusion spec.
pub fn should_exclude(filename: &str, exclusion_spec: Option<&str>) -> bool {
    match exclusion_spec {
        Some(spec) => ExclusionList::parse(spec).matches(filename),
        None => false,
    }
}

/// Lower-cased text after the last `.`, or `None` when there is no dot.
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rfind('.')
        .map(|idx| filename[idx + 1..].to_lowercase())
}
