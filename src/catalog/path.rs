use std::fmt;

const SEPARATOR: char = ':';
const ESCAPE: char = '\\';
const DELIMITER: char = '@';

/// Location of a node inside the catalog, starting with the catalog name.
///
/// Keys of groups and indices of sequences both become plain segments. A key
/// containing `:`, `@` or `\` is escaped with `\` when rendered, so two distinct
/// paths never render to the same string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TagPath {
    segments: Vec<String>,
}

impl TagPath {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn index(&self, idx: usize) -> Self {
        self.child(idx.to_string())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn catalog(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The `@path@` placeholder inserted into prompts for this location.
    pub fn token(&self) -> String {
        format!("{DELIMITER}{self}{DELIMITER}")
    }

    /// Parses the text between the `@` delimiters of a placeholder.
    pub fn parse(reference: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = reference.chars();
        while let Some(ch) = chars.next() {
            match ch {
                ESCAPE => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    } else {
                        current.push(ESCAPE);
                    }
                }
                SEPARATOR => segments.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            }
        }
        segments.push(current);
        Self { segments }
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            for ch in segment.chars() {
                if matches!(ch, SEPARATOR | ESCAPE | DELIMITER) {
                    write!(f, "{ESCAPE}")?;
                }
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}
