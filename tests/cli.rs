// cli.rs - Runs the njtree binary on pre-aligned FASTA files

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use njtree::newick::parse_newick;
use njtree::output::TreeResponse;

const THREE_TAXA: &str = ">a\nACGTACGTACGT\n>b\nACGTACGTACGA\n>c\nACGAACGTTCGA\n";
const FOUR_TAXA: &str = ">a\nACGTACGTACGT\n>b\nACGTACGTACGA\n>c\nACGAACGTTCGA\n>d\nTCGAACGTTCGA\n";

fn njtree(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_njtree"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("njtree binary runs")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_stdout_holds_only_the_tree_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let fasta = dir.path().join("x.fasta");
    let config = dir.path().join("c.toml");
    fs::write(&fasta, THREE_TAXA).unwrap();
    fs::write(&config, "aligner = \"none\"\nmodel = \"auto\"\n").unwrap();

    let output = njtree(&["--input", path_str(&fasta), "--config", path_str(&config)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {:?}", stdout);
    assert_eq!(parse_newick(lines[0]).unwrap().num_leaves(), 3);
}

#[test]
fn test_json_stdout_stays_parseable_with_filter_list() {
    let dir = tempfile::tempdir().unwrap();
    let fasta = dir.path().join("x.fasta");
    let keep = dir.path().join("keep.txt");
    fs::write(&fasta, FOUR_TAXA).unwrap();
    fs::write(&keep, "a\nb\nc\n").unwrap();

    let output = njtree(&[
        "--input",
        path_str(&fasta),
        "--aligner",
        "none",
        "--json",
        "--include-taxa-list",
        path_str(&keep),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let responses: Vec<TreeResponse> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("{:?}: {}", line, e)))
        .collect();
    assert_eq!(responses.len(), 1);
    let newick = responses[0].newick_tree.as_deref().unwrap();
    assert_eq!(parse_newick(newick).unwrap().num_leaves(), 3);
}

#[test]
fn test_inputs_sharing_a_stem_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    let out = dir.path().join("out");
    fs::create_dir(&inputs).unwrap();
    fs::write(inputs.join("seqs.fa"), THREE_TAXA).unwrap();
    fs::write(inputs.join("seqs.fasta"), FOUR_TAXA).unwrap();

    let output = njtree(&[
        "--input",
        path_str(&inputs),
        "--aligner",
        "none",
        "--output",
        path_str(&out),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("same output name"));
    assert!(!out.join("seqs.nwk").exists());
}

#[test]
fn test_batch_writes_one_tree_per_input() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    let out = dir.path().join("out");
    fs::create_dir(&inputs).unwrap();
    fs::write(inputs.join("first.fa"), THREE_TAXA).unwrap();
    fs::write(inputs.join("second.fasta"), FOUR_TAXA).unwrap();

    let output = njtree(&[
        "--input",
        path_str(&inputs),
        "--aligner",
        "none",
        "--output",
        path_str(&out),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let first = fs::read_to_string(out.join("first.nwk")).unwrap();
    let second = fs::read_to_string(out.join("second.nwk")).unwrap();
    assert_eq!(parse_newick(&first).unwrap().num_leaves(), 3);
    assert_eq!(parse_newick(&second).unwrap().num_leaves(), 4);
}
