// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::error::Result;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.input.is_empty() {
            self.input = config.input.unwrap_or_default();
        }
        if self.output.is_none() {
            self.output = config.output;
        }

        // Alignment (only override defaults, not explicit CLI values)
        if let Some(aligner) = config.aligner {
            if self.aligner == "clustalw" {
                self.aligner = aligner;
            }
        }
        if self.aligner_path.is_none() {
            self.aligner_path = config.aligner_path;
        }
        if let Some(timeout) = config.align_timeout {
            if self.align_timeout == 300 {
                self.align_timeout = timeout;
            }
        }

        // Distances
        if let Some(model) = config.model {
            if self.model == "auto" {
                self.model = model;
            }
        }
        if self.matrix_output.is_none() {
            self.matrix_output = config.matrix_output;
        }
        if let Some(format) = config.matrix_format {
            if self.matrix_format == "tsv" {
                self.matrix_format = format;
            }
        }

        // Taxon filtering
        if self.include_taxa.is_none() {
            self.include_taxa = config.include_taxa;
        }
        if self.exclude_taxa.is_none() {
            self.exclude_taxa = config.exclude_taxa;
        }
        if self.include_taxa_list.is_none() {
            self.include_taxa_list = config.include_taxa_list;
        }
        if self.exclude_taxa_list.is_none() {
            self.exclude_taxa_list = config.exclude_taxa_list;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.json && config.json.unwrap_or(false) {
            self.json = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["njtree"], args).unwrap()
    }

    #[test]
    fn test_config_fills_unset_values() {
        let config = Config {
            input: Some(vec!["a.fasta".to_string()]),
            model: Some("blosum62".to_string()),
            align_timeout: Some(60),
            dry_run: Some(true),
            ..Config::default()
        };
        let args = parse(&[]).merge_with_config(config);
        assert_eq!(args.input, vec!["a.fasta"]);
        assert_eq!(args.model, "blosum62");
        assert_eq!(args.align_timeout, 60);
        assert!(args.dry_run);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            input: Some(vec!["from_config.fasta".to_string()]),
            model: Some("blosum62".to_string()),
            threads: Some(2),
            ..Config::default()
        };
        let args = parse(&["--input", "cli.fasta", "--model", "kimura", "--threads", "8"])
            .merge_with_config(config);
        assert_eq!(args.input, vec!["cli.fasta"]);
        assert_eq!(args.model, "kimura");
        assert_eq!(args.threads, Some(8));
    }
}
