use std::path::PathBuf;

use clap::Parser;

use crate::sources::SourceSet;
use crate::template::SelectionMode;

/// Pick tags from YAML catalogs and splice them into a prompt.
#[derive(Clone, Debug, Parser)]
#[command(name = "prompt-tags", version, about)]
pub struct Config {
    /// Directory searched recursively for `*.yml` / `*.yaml` tag files
    #[arg(long, env = "PROMPT_TAGS_DIR", default_value = "tags")]
    pub tags_dir: PathBuf,

    /// Additional tag files, loaded after the directory
    pub files: Vec<PathBuf>,

    /// Log file path (defaults to the system temp directory)
    #[arg(long, env = "PROMPT_TAGS_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Seed for placeholder previews
    #[arg(long)]
    pub seed: Option<u64>,

    /// How previews pick placeholder snippets
    #[arg(long, value_enum, env = "PROMPT_TAGS_MODE", default_value_t = SelectionMode::Random)]
    pub mode: SelectionMode,

    /// Start with tags routed to the negative prompt
    #[arg(long)]
    pub negative: bool,

    /// Initial prompt text
    #[arg(long, default_value = "")]
    pub prompt: String,

    /// Initial negative prompt text
    #[arg(long, default_value = "")]
    pub negative_prompt: String,
}

impl Config {
    pub fn sources(&self) -> SourceSet {
        SourceSet::new(Some(self.tags_dir.clone()), self.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_tags_directory() {
        let config = Config::try_parse_from(["prompt-tags"]).unwrap();
        assert_eq!(config.tags_dir, PathBuf::from("tags"));
        assert!(config.files.is_empty());
        assert!(!config.negative);
        assert_eq!(config.mode, SelectionMode::Random);
        assert_eq!(config.sources().dir, Some(PathBuf::from("tags")));
    }

    #[test]
    fn parses_files_and_flags() {
        let config = Config::try_parse_from([
            "prompt-tags",
            "--tags-dir",
            "/srv/tags",
            "--seed",
            "9",
            "--negative",
            "--mode",
            "round-robin",
            "--prompt",
            "1girl, smile",
            "extra.yml",
        ])
        .unwrap();
        assert_eq!(config.tags_dir, PathBuf::from("/srv/tags"));
        assert_eq!(config.seed, Some(9));
        assert!(config.negative);
        assert_eq!(config.mode, SelectionMode::RoundRobin);
        assert_eq!(config.prompt, "1girl, smile");
        assert_eq!(config.sources().files, vec![PathBuf::from("extra.yml")]);
    }
}
