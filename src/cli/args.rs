// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// njtree - Neighbor-joining phylogenetic trees from FASTA sequences
pub struct Args {
    /// input FASTA file or directory of FASTA files (repeatable)
    #[argh(option)]
    pub input: Vec<String>,

    /// output Newick file (a directory when several inputs are given; default: stdout)
    #[argh(option)]
    pub output: Option<String>,

    /// aligner: clustalw, none (default: clustalw)
    #[argh(option, default = "String::from(\"clustalw\")")]
    pub aligner: String,

    /// path to the aligner executable (default: clustalw2 or clustalw on PATH)
    #[argh(option)]
    pub aligner_path: Option<String>,

    /// aligner timeout in seconds (default: 300)
    #[argh(option, default = "300")]
    pub align_timeout: u64,

    /// substitution model: auto, identity, kimura, blosum62 (default: auto)
    #[argh(option, default = "String::from(\"auto\")")]
    pub model: String,

    /// also write the distance matrix to this file (a directory for several inputs)
    #[argh(option)]
    pub matrix_output: Option<String>,

    /// distance matrix format: tsv, csv, phylip, nexus (default: tsv)
    #[argh(option, default = "String::from(\"tsv\")")]
    pub matrix_format: String,

    /// include only taxa whose id matches regex pattern
    #[argh(option)]
    pub include_taxa: Option<String>,

    /// exclude taxa whose id matches regex pattern
    #[argh(option)]
    pub exclude_taxa: Option<String>,

    /// include only taxa listed in a file (one id per line)
    #[argh(option)]
    pub include_taxa_list: Option<String>,

    /// exclude taxa listed in a file (one id per line)
    #[argh(option)]
    pub exclude_taxa_list: Option<String>,

    /// number of threads for batch runs (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// print one JSON response per input instead of plain Newick
    #[argh(switch)]
    pub json: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
