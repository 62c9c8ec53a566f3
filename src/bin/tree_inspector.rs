// tree_inspector.rs - Validate a Newick file and report tree statistics

use std::fs;

use clap::{Arg, ArgAction, Command};

use njtree::core::{LeafComparison, TreeStats};
use njtree::data::read_fasta_file;
use njtree::newick::parse_newick;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("Tree Inspector")
        .version(njtree::VERSION)
        .about("Checks Newick trees written by njtree and prints their statistics")
        .arg(Arg::new("tree")
            .long("tree")
            .value_name("FILE")
            .help("Path to the Newick tree file")
            .required(true))
        .arg(Arg::new("fasta")
            .long("fasta")
            .value_name("FILE")
            .help("FASTA file whose ids should match the tree leaves"))
        .arg(Arg::new("json")
            .long("json")
            .help("Print statistics as JSON")
            .action(ArgAction::SetTrue))
        .get_matches();

    let tree_path = matches
        .get_one::<String>("tree")
        .ok_or("--tree is required")?;
    let text = fs::read_to_string(tree_path)
        .map_err(|e| format!("Failed to read tree file '{}': {}", tree_path, e))?;
    let tree = parse_newick(&text)?;
    let stats = TreeStats::from_tree(&tree);

    let comparison = match matches.get_one::<String>("fasta") {
        Some(fasta_path) => {
            let sequences = read_fasta_file(std::path::Path::new(fasta_path))?;
            Some(LeafComparison::new(&tree, sequences.iter().map(|s| s.id.as_str())))
        }
        None => None,
    };

    if matches.get_flag("json") {
        let report = serde_json::json!({
            "file": tree_path,
            "stats": stats,
            "leaf_comparison": comparison,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("🔬 njtree Tree Inspector");
        println!("========================");
        println!("📂 Tree file: {}", tree_path);
        println!("🍃 Leaves: {}", stats.leaves);
        println!("🔗 Internal nodes: {}", stats.internal_nodes);
        println!("📏 Total branch length: {:.5}", stats.total_branch_length);
        match stats.max_branch_length {
            Some(max) => println!("📐 Longest branch: {:.5}", max),
            None => println!("📐 Longest branch: n/a"),
        }
        if stats.unrooted_binary {
            println!("✅ Unrooted binary tree ({} internal nodes for {} leaves)", stats.internal_nodes, stats.leaves);
        } else {
            println!("⚠️  Not an unrooted binary tree");
        }
        if !stats.duplicate_leaves.is_empty() {
            println!("⚠️  Duplicate leaf names: {}", stats.duplicate_leaves.join(", "));
        }
        if let Some(comparison) = &comparison {
            if comparison.is_match() {
                println!("✅ Leaf names match the FASTA ids");
            } else {
                for id in &comparison.missing_from_tree {
                    println!("❌ Missing from tree: {}", id);
                }
                for leaf in &comparison.unexpected_in_tree {
                    println!("❌ Not in FASTA: {}", leaf);
                }
            }
        }
    }

    let leaves_match = comparison.as_ref().map_or(true, |c| c.is_match());
    if !leaves_match || !stats.duplicate_leaves.is_empty() {
        return Err("tree leaves do not match the expected taxa".into());
    }
    Ok(())
}
