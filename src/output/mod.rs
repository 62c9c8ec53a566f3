// mod.rs - Output formatters module

pub mod response;

use std::fmt;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::core::distance::DistanceMatrix;
use crate::error::{PhyloError, Result};

pub use crate::newick::write_newick_file;
pub use response::TreeResponse;

/// Decimal places for distances in matrix files
const DISTANCE_PRECISION: usize = 5;

/// Supported distance matrix file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixFormat {
    #[default]
    Tsv,
    Csv,
    Phylip,
    Nexus,
}

impl FromStr for MatrixFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(MatrixFormat::Tsv),
            "csv" => Ok(MatrixFormat::Csv),
            "phylip" => Ok(MatrixFormat::Phylip),
            "nexus" => Ok(MatrixFormat::Nexus),
            _ => Err(format!("Unsupported output format: {}. Use: tsv, csv, phylip, nexus", s)),
        }
    }
}

impl fmt::Display for MatrixFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatrixFormat::Tsv => "tsv",
            MatrixFormat::Csv => "csv",
            MatrixFormat::Phylip => "phylip",
            MatrixFormat::Nexus => "nexus",
        };
        write!(f, "{}", name)
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|e| {
                PhyloError::config(format!(
                    "Failed to create parent directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

fn format_distance(d: f64) -> String {
    format!("{:.*}", DISTANCE_PRECISION, d)
}

fn model_label(matrix: &DistanceMatrix) -> &'static str {
    matrix.model().map(|m| m.key()).unwrap_or("user")
}

/// Provenance lines shared by the delimited formats
fn write_comment_header<W: Write>(writer: &mut W, matrix: &DistanceMatrix, command_line: &str) -> Result<()> {
    writeln!(writer, "# Command: {}", command_line)?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(writer, "# njtree v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(writer, "# Model: {}", model_label(matrix))?;
    Ok(())
}

fn write_delimited<W: Write>(
    writer: &mut W,
    matrix: &DistanceMatrix,
    command_line: &str,
    separator: char,
) -> Result<()> {
    write_comment_header(writer, matrix, command_line)?;

    write!(writer, "Taxon")?;
    for name in matrix.names() {
        write!(writer, "{}{}", separator, name)?;
    }
    writeln!(writer)?;

    for (i, name) in matrix.names().iter().enumerate() {
        write!(writer, "{}", name)?;
        for d in matrix.row(i) {
            write!(writer, "{}{}", separator, format_distance(*d))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write distance matrix in TSV format
pub fn write_tsv<W: Write>(writer: &mut W, matrix: &DistanceMatrix, command_line: &str) -> Result<()> {
    write_delimited(writer, matrix, command_line, '\t')
}

/// Write distance matrix in CSV format
pub fn write_csv<W: Write>(writer: &mut W, matrix: &DistanceMatrix, command_line: &str) -> Result<()> {
    write_delimited(writer, matrix, command_line, ',')
}

/// Write distance matrix in PHYLIP format (lower triangle).
///
/// Provenance goes after the matrix since PHYLIP has no comment syntax.
pub fn write_phylip<W: Write>(writer: &mut W, matrix: &DistanceMatrix, command_line: &str) -> Result<()> {
    writeln!(writer, "    {}", matrix.len())?;

    for (i, name) in matrix.names().iter().enumerate() {
        write!(writer, "{:<10}", name)?;
        for d in &matrix.row(i)[..=i] {
            write!(writer, "  {}", format_distance(*d))?;
        }
        writeln!(writer)?;
    }

    writeln!(writer)?;
    write_comment_header(writer, matrix, command_line)?;
    Ok(())
}

/// Write distance matrix as a NEXUS DISTANCES block
pub fn write_nexus<W: Write>(writer: &mut W, matrix: &DistanceMatrix, command_line: &str) -> Result<()> {
    writeln!(writer, "#NEXUS")?;
    writeln!(writer, "[Command: {}]", command_line)?;
    writeln!(writer, "[Generated: {}]", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(writer, "[njtree v{}, model {}]", env!("CARGO_PKG_VERSION"), model_label(matrix))?;
    writeln!(writer, "BEGIN DISTANCES;")?;
    writeln!(writer, "    DIMENSIONS NTAX={};", matrix.len())?;
    writeln!(writer, "    FORMAT LABELS LOWER DIAGONAL;")?;
    writeln!(writer, "    MATRIX")?;

    for (i, name) in matrix.names().iter().enumerate() {
        write!(writer, "        {}", crate::newick::escape_label(name))?;
        for d in &matrix.row(i)[..=i] {
            write!(writer, " {}", format_distance(*d))?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "    ;")?;
    writeln!(writer, "END;")?;
    Ok(())
}

/// Write distance matrix to a file in the specified format
pub fn write_matrix(file_path: &Path, format: MatrixFormat, matrix: &DistanceMatrix, command_line: &str) -> Result<()> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);

    match format {
        MatrixFormat::Tsv => write_tsv(&mut writer, matrix, command_line)?,
        MatrixFormat::Csv => write_csv(&mut writer, matrix, command_line)?,
        MatrixFormat::Phylip => write_phylip(&mut writer, matrix, command_line)?,
        MatrixFormat::Nexus => write_nexus(&mut writer, matrix, command_line)?,
    }

    writer.flush()?;
    info!("Distance matrix written to {} ({} format)", file_path.display(), format);
    Ok(())
}
