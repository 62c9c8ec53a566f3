// main.rs - CLI entry point

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use njtree::cli::validation::output_stem;
use njtree::cli::Config;
use njtree::data::fasta::parse_fasta_for_tree;
use njtree::data::Alignment;
use njtree::prelude::*;
use njtree::Result;

type RunResult = std::result::Result<PipelineOutput, StageFailure>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

/// Status lines go to stdout unless stdout carries the trees themselves
struct Reporter {
    quiet: bool,
}

impl Reporter {
    fn line(&self, message: impl std::fmt::Display) {
        if self.quiet {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }
}

fn run_main() -> Result<()> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation = validate_args(&args)?;
    let report = Reporter {
        quiet: args.json || args.output.is_none(),
    };

    report.line(format!("🚀 njtree v{}", njtree::VERSION));
    report.line(format!("📂 Inputs: {} FASTA file(s)", validation.inputs.len()));

    if args.dry_run {
        return run_dry(&validation.inputs, &report);
    }

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| PhyloError::config(format!("Failed to configure thread pool: {}", e)))?;
        report.line(format!("🧵 Threads: {}", n));
    } else {
        report.line(format!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads()));
    }

    let aligner: Box<dyn Aligner> = match validation.aligner {
        AlignerKind::None => Box::new(PreAligned),
        AlignerKind::Clustalw => Box::new(
            ClustalwAligner::from_path_or_detect(args.aligner_path.as_deref().map(Path::new))?
                .with_timeout(validation.align_timeout),
        ),
    };
    report.line(format!(
        "🧬 Aligner: {} | Model: {} | Matrix format: {}",
        aligner.name(),
        validation.model_policy,
        validation.matrix_format
    ));

    let pipeline = Pipeline::new(aligner)
        .with_model_policy(validation.model_policy)
        .with_taxon_filter(validation.taxon_filter.clone());

    let total_start = Instant::now();
    let inputs = &validation.inputs;

    let pb = if inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    // Independent runs; collect keeps input order
    let results: Vec<(&PathBuf, RunResult)> = inputs
        .par_iter()
        .map(|path| {
            let result = run_file(&pipeline, path);
            pb.inc(1);
            (path, result)
        })
        .collect();
    pb.finish_and_clear();

    let multiple = inputs.len() > 1;
    let mut failures = 0;
    for (path, result) in &results {
        if args.json {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            println!("{}", TreeResponse::from_result(result, name.as_deref()).to_json());
        }

        match result {
            Ok(output) => {
                if let Some(out) = &args.output {
                    let tree_path = output_path(out, path, "nwk", multiple);
                    njtree::output::write_newick_file(&tree_path, &output.tree)?;
                    report.line(format!("✅ Tree written to: {}", tree_path.display()));
                } else if !args.json {
                    println!("{}", output.newick);
                }

                if let Some(matrix_out) = &args.matrix_output {
                    let extension = matrix_extension(validation.matrix_format);
                    let matrix_path = output_path(matrix_out, path, extension, multiple);
                    write_matrix(&matrix_path, validation.matrix_format, &output.matrix, &command_line)?;
                    report.line(format!("✅ Distance matrix written to: {}", matrix_path.display()));
                }

                report.line(format!(
                    "🌳 {}: {} taxa, {} model, total branch length {:.5}",
                    path.display(),
                    output.tree.num_leaves(),
                    output.matrix.model().map(|m| m.key()).unwrap_or("unknown"),
                    output.tree.total_branch_length()
                ));
            }
            Err(failure) => {
                failures += 1;
                eprintln!("❌ {}: {}", path.display(), failure);
            }
        }
    }

    report.line(format!(
        "⏱️  Completed {} input(s) in {:.2}s",
        results.len(),
        total_start.elapsed().as_secs_f64()
    ));

    if failures > 0 {
        return Err(PhyloError::input(format!(
            "{} of {} input(s) failed",
            failures,
            results.len()
        )));
    }
    Ok(())
}

fn run_file<A: Aligner>(pipeline: &Pipeline<A>, path: &Path) -> RunResult {
    let text = fs::read_to_string(path).map_err(|e| StageFailure::new(Stage::Input, &PhyloError::from(e)))?;
    pipeline.run_fasta(&text)
}

/// Validate FASTA inputs without aligning or building trees
fn run_dry(inputs: &[PathBuf], report: &Reporter) -> Result<()> {
    let mut failures = 0;
    for path in inputs {
        let parsed = fs::read_to_string(path)
            .map_err(PhyloError::from)
            .and_then(|text| parse_fasta_for_tree(&text));
        match parsed {
            Ok(sequences) => {
                let alphabet = Alphabet::classify(&njtree::data::sequence::residue_set(&sequences));
                let min_len = sequences.iter().map(|s| s.len()).min().unwrap_or(0);
                let max_len = sequences.iter().map(|s| s.len()).max().unwrap_or(0);
                let aligned = Alignment::new(sequences.clone()).is_ok();
                report.line(format!(
                    "✅ {}: {} sequences, {} alphabet, length {}-{}{}",
                    path.display(),
                    sequences.len(),
                    alphabet,
                    min_len,
                    max_len,
                    if aligned { " (already aligned)" } else { "" }
                ));
            }
            Err(e) => {
                failures += 1;
                eprintln!("❌ {}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        return Err(PhyloError::input(format!("{} input(s) failed validation", failures)));
    }
    report.line("✅ Dry run completed successfully");
    Ok(())
}

/// The given path for a single input, `<dir>/<input stem>.<ext>` for several
fn output_path(target: &str, input: &Path, extension: &str, multiple: bool) -> PathBuf {
    if multiple {
        Path::new(target).join(format!("{}.{}", output_stem(input), extension))
    } else {
        PathBuf::from(target)
    }
}

fn matrix_extension(format: MatrixFormat) -> &'static str {
    match format {
        MatrixFormat::Tsv => "tsv",
        MatrixFormat::Csv => "csv",
        MatrixFormat::Phylip => "phy",
        MatrixFormat::Nexus => "nex",
    }
}
