// pipeline.rs - Orchestration: FASTA -> alignment -> distances -> tree -> Newick

use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use log::info;
use regex::Regex;
use serde::Serialize;

use crate::align::{Aligner, PreAligned};
use crate::core::distance::{DistanceMatrix, DistanceMatrixBuilder, ModelPolicy};
use crate::core::nj::NeighborJoiningTreeBuilder;
use crate::core::tree::Tree;
use crate::data::{fasta, Alignment, Sequence};
use crate::error::{ErrorKind, PhyloError};
use crate::newick::to_newick;

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Input,
    Alignment,
    Distance,
    Tree,
}

impl Stage {
    /// Short headline reported to users for a failure in this stage
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Input => "Invalid input",
            Stage::Alignment => "MSA failed",
            Stage::Distance => "Distance calculation failed",
            Stage::Tree => "Tree construction failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "InputStage",
            Stage::Alignment => "AlignmentStage",
            Stage::Distance => "DistanceStage",
            Stage::Tree => "TreeStage",
        };
        write!(f, "{}", name)
    }
}

/// First failure of a pipeline run, tagged with its stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, error: &PhyloError) -> Self {
        Self {
            stage,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// 400 when the caller's data is at fault, 500 for processing failures
    pub fn http_status(&self) -> u16 {
        if self.kind.is_input_class() {
            400
        } else {
            500
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} in {}): {}", self.stage.failure_message(), self.kind, self.stage, self.message)
    }
}

impl std::error::Error for StageFailure {}

/// Include/exclude filters on sequence ids, by regex and by explicit id lists
#[derive(Debug, Clone, Default)]
pub struct TaxonFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
    include_ids: Option<HashSet<String>>,
    exclude_ids: Option<HashSet<String>>,
}

impl TaxonFilter {
    pub fn new(include: Option<Regex>, exclude: Option<Regex>) -> Self {
        Self {
            include,
            exclude,
            ..Self::default()
        }
    }

    pub fn with_id_lists(mut self, include_ids: Option<HashSet<String>>, exclude_ids: Option<HashSet<String>>) -> Self {
        self.include_ids = include_ids;
        self.exclude_ids = exclude_ids;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_none()
            && self.exclude.is_none()
            && self.include_ids.is_none()
            && self.exclude_ids.is_none()
    }

    /// Passes every include filter and no exclude filter
    pub fn matches(&self, id: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |re| re.is_match(id))
            && self.include_ids.as_ref().map_or(true, |ids| ids.contains(id));
        let excluded = self.exclude.as_ref().map_or(false, |re| re.is_match(id))
            || self.exclude_ids.as_ref().map_or(false, |ids| ids.contains(id));
        included && !excluded
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub alignment: Alignment,
    pub matrix: DistanceMatrix,
    pub tree: Tree,
    pub newick: String,
}

/// Stateless orchestrator; each run owns its own alignment, matrix and tree,
/// so one pipeline can serve concurrent runs
pub struct Pipeline<A: Aligner = PreAligned> {
    aligner: A,
    distance_builder: DistanceMatrixBuilder,
    tree_builder: NeighborJoiningTreeBuilder,
    taxon_filter: TaxonFilter,
}

impl Default for Pipeline<PreAligned> {
    fn default() -> Self {
        Self::new(PreAligned)
    }
}

impl<A: Aligner> Pipeline<A> {
    pub fn new(aligner: A) -> Self {
        Self {
            aligner,
            distance_builder: DistanceMatrixBuilder::default(),
            tree_builder: NeighborJoiningTreeBuilder::new(),
            taxon_filter: TaxonFilter::default(),
        }
    }

    pub fn with_model_policy(mut self, policy: ModelPolicy) -> Self {
        self.distance_builder = DistanceMatrixBuilder::new(policy);
        self
    }

    pub fn with_taxon_filter(mut self, filter: TaxonFilter) -> Self {
        self.taxon_filter = filter;
        self
    }

    pub fn aligner(&self) -> &A {
        &self.aligner
    }

    /// Parse FASTA text and run every stage
    pub fn run_fasta(&self, text: &str) -> Result<PipelineOutput, StageFailure> {
        let sequences =
            fasta::parse_fasta_for_tree(text).map_err(|e| StageFailure::new(Stage::Input, &e))?;
        self.run_sequences(sequences)
    }

    /// Run alignment, distance and tree stages on parsed sequences.
    ///
    /// Stops at the first failing stage; no partial results are returned.
    pub fn run_sequences(&self, sequences: Vec<Sequence>) -> Result<PipelineOutput, StageFailure> {
        let start = Instant::now();
        let sequences = self.filter(sequences).map_err(|e| StageFailure::new(Stage::Input, &e))?;

        let alignment = self
            .aligner
            .align(&sequences)
            .map_err(|e| StageFailure::new(Stage::Alignment, &e))?;
        info!(
            "Alignment stage ({}): {} sequences x {} columns",
            self.aligner.name(),
            alignment.len(),
            alignment.width()
        );

        let matrix = self
            .distance_builder
            .build(&alignment)
            .map_err(|e| StageFailure::new(Stage::Distance, &e))?;

        let tree = self
            .tree_builder
            .build(&matrix)
            .map_err(|e| StageFailure::new(Stage::Tree, &e))?;
        let newick = to_newick(&tree);

        info!(
            "Pipeline finished in {:.3}s: {} taxa",
            start.elapsed().as_secs_f64(),
            tree.num_leaves()
        );
        Ok(PipelineOutput {
            alignment,
            matrix,
            tree,
            newick,
        })
    }

    fn filter(&self, sequences: Vec<Sequence>) -> crate::error::Result<Vec<Sequence>> {
        if self.taxon_filter.is_empty() {
            return Ok(sequences);
        }
        let total = sequences.len();
        let kept: Vec<Sequence> = sequences
            .into_iter()
            .filter(|s| self.taxon_filter.matches(&s.id))
            .collect();
        info!("Taxon filter kept {} of {} sequences", kept.len(), total);
        if kept.len() < fasta::MIN_RECORDS {
            return Err(PhyloError::input(format!(
                "at least {} sequences must pass the taxon filters, got {}",
                fasta::MIN_RECORDS,
                kept.len()
            )));
        }
        Ok(kept)
    }
}
