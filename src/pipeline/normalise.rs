//! Per-tree distance normalisation.
//!
//! Both modes root the tree, classify its events, annotate its leaves and use
//! the median root-to-leaf distance of the normalising clade as `nfactor`.
//! Distances divided by a zero or NaN `nfactor` become infinite or NaN.

use crate::analysis::{
    AnalysisError, BranchStats, EventCounts, FeatureTable, SpeciesAges, annotate, branch_stats, classify_events, count_events,
    lineage_events_between, locate_clade, root_at_midpoint, root_by_age,
};
use crate::model::{AnnotationValue, Event, GeneTree, species_tag};
use crate::newick::{NewickStyle, parse_str, to_newick};
use crate::pipeline::batch::TreeRecord;
use crate::pipeline::config::{RunConfig, TargetGroup, TreeFilter};
use crate::pipeline::error::PipelineError;
use crate::pipeline::record::Record;
use log::{Level, debug, info, log_enabled, warn};

/// Columns and tag that select the normalising clade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalisingGroup {
    pub species_column: String,
    pub column: String,
    pub tag: String,
}

impl NormalisingGroup {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            species_column: config.species_column.clone(),
            column: config.norm_column.clone(),
            tag: config.norm_tag.clone(),
        }
    }
}

fn parse_tree(record: &TreeRecord) -> Result<GeneTree, PipelineError> {
    parse_str(&record.newick).map_err(|source| PipelineError::Parse {
        seed: record.seed.clone(),
        source,
    })
}

fn log_rooted(seed: &str, tree: &GeneTree) {
    if log_enabled!(Level::Debug) {
        debug!("Tree {seed} rooted: {}", to_newick(tree, NewickStyle::Annotated));
    }
}

fn warn_on_zero(seed: &str, nfactor: f64) {
    if nfactor == 0.0 || nfactor.is_nan() {
        warn!("Tree {seed}: normalisation factor is {nfactor}, normalised distances are not finite");
    }
}

fn count_fields(prefix: &str, counts: EventCounts) -> [(String, AnnotationValue); 2] {
    [
        (format!("{prefix}{}", Event::Duplication.code()), counts.duplications.into()),
        (format!("{prefix}{}", Event::Speciation.code()), counts.speciations.into()),
    ]
}

// =#========================================================================#=
// CLADE DISTANCE
// =#========================================================================#=
/// Distances from the seed leaf to target clades, one record per tree.
///
/// The record holds, in this order: `seed`, `species`, `<target>_dist` for
/// every target and `seed_dist`, the same as `_ndist`, `nfactor`, the
/// statistics and `D`/`S` counts of the normalising clade prefixed `norm_`,
/// and those of the whole tree prefixed `whole_`.
#[derive(Debug, Clone)]
pub struct CladeDistance {
    pub group: NormalisingGroup,
    pub targets: Vec<TargetGroup>,
    pub ages: SpeciesAges,
    pub table: FeatureTable,
}

impl CladeDistance {
    pub fn process(&self, record: &TreeRecord) -> Result<Record, PipelineError> {
        let seed = record.seed.as_str();
        let wrap = PipelineError::analysis(seed);
        info!("Calculating: {seed}");

        let mut tree = parse_tree(record)?;
        let outgroup = root_by_age(&mut tree, &self.ages).map_err(&wrap)?;
        classify_events(&mut tree);
        log_rooted(seed, &tree);
        debug!("Tree {seed} rooted at {outgroup}");

        let mut columns = vec![self.group.column.clone()];
        columns.extend(self.targets.iter().map(|t| t.column.clone()));
        annotate(&mut tree, &self.table, &self.group.species_column, columns).map_err(&wrap)?;

        let norm = locate_clade(&tree, seed, &self.group.column, self.group.tag.as_str(), None).map_err(&wrap)?;
        let norm_stats = branch_stats(&tree, norm.vertex);
        let norm_counts = count_events(&tree, norm.vertex).map_err(&wrap)?;
        let nfactor = norm_stats.median;
        warn_on_zero(seed, nfactor);

        let seed_leaf = tree
            .find_leaf(seed)
            .ok_or_else(|| wrap(AnalysisError::LeafNotFound(seed.to_string())))?;

        let mut distances = Vec::with_capacity(self.targets.len() + 1);
        for target in &self.targets {
            let must_include = target.must_include_seed.then_some(seed);
            let clade = locate_clade(&tree, seed, &target.column, target.tag.as_str(), must_include).map_err(&wrap)?;
            distances.push((target.name.as_str(), tree.distance(clade.vertex, seed_leaf)));
        }
        distances.push(("seed", tree.distance_to_root(seed_leaf)));

        let mut out = Record::new();
        out.set("seed", seed);
        out.set("species", species_tag(seed));
        for (name, dist) in &distances {
            out.set(format!("{name}_dist"), *dist);
        }
        for (name, dist) in &distances {
            out.set(format!("{name}_ndist"), dist / nfactor);
        }
        out.set("nfactor", nfactor);
        out.extend(norm_stats.fields("norm_"));
        out.extend(count_fields("norm_", norm_counts));

        let root = tree.root_index();
        out.extend(branch_stats(&tree, root).fields("whole_"));
        out.extend(count_fields("whole_", count_events(&tree, root).map_err(&wrap)?));

        Ok(out)
    }
}

// =#========================================================================#=
// PAIRWISE
// =#========================================================================#=
/// Records of one tree in pairwise mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseOutput {
    /// `tree` and the normalising clade statistics
    pub norm: Record,
    /// One record per unordered pair of leaves
    pub pairs: Vec<Record>,
}

/// Leaf-to-leaf distances and the events between them.
#[derive(Debug, Clone)]
pub struct Pairwise {
    pub group: NormalisingGroup,
    pub filter: TreeFilter,
    pub phylome: String,
    pub table: FeatureTable,
}

impl Pairwise {
    /// Processes one tree; `None` if the tree does not pass the filter.
    ///
    /// Pairs follow the leaf order of the tree as read, before midpoint
    /// rooting. Pairs of equally named leaves are skipped.
    pub fn process(&self, record: &TreeRecord) -> Result<Option<PairwiseOutput>, PipelineError> {
        let seed = record.seed.as_str();
        let wrap = PipelineError::analysis(seed);

        let mut tree = parse_tree(record)?;
        let num_species = tree.species().len();
        let num_leaves = tree.num_leaves();
        if !self.filter.accepts(num_species, num_leaves) {
            debug!("Skipping {seed}: {num_species} species, {num_leaves} leaves");
            return Ok(None);
        }
        info!("Calculating: {seed}, species no.: {num_species}, leaves no.: {num_leaves}");

        let names: Vec<String> = tree.leaf_names().into_iter().map(str::to_string).collect();
        root_at_midpoint(&mut tree).map_err(&wrap)?;
        classify_events(&mut tree);
        log_rooted(seed, &tree);
        annotate(&mut tree, &self.table, &self.group.species_column, self.group.column.as_str()).map_err(&wrap)?;

        let norm = locate_clade(&tree, seed, &self.group.column, self.group.tag.as_str(), None).map_err(&wrap)?;
        let norm_stats: BranchStats = branch_stats(&tree, norm.vertex);
        let nfactor = norm_stats.median;
        warn_on_zero(seed, nfactor);

        let mut norm_record = Record::new();
        norm_record.set("tree", seed);
        norm_record.extend(norm_stats.fields(""));

        let mut pairs = Vec::new();
        for (i, from) in names.iter().enumerate() {
            for to in &names[i + 1..] {
                if from == to {
                    continue;
                }
                pairs.push(self.pair_record(&tree, seed, from, to, nfactor).map_err(&wrap)?);
            }
        }

        Ok(Some(PairwiseOutput {
            norm: norm_record,
            pairs,
        }))
    }

    fn pair_record(
        &self,
        tree: &GeneTree,
        seed: &str,
        from: &str,
        to: &str,
        nfactor: f64,
    ) -> Result<Record, AnalysisError> {
        let find = |name: &str| tree.find_leaf(name).ok_or_else(|| AnalysisError::LeafNotFound(name.to_string()));
        let (a, b) = (find(from)?, find(to)?);
        let events = lineage_events_between(tree, a, b)?;
        let dist = tree.distance(a, b);

        let mut out = Record::new();
        out.set("id", self.phylome.as_str());
        out.set("tree", seed);
        out.set("from", from);
        out.set("from_sp", species_tag(from));
        out.set("to", to);
        out.set("to_sp", species_tag(to));
        out.set("sp", events.counts.speciations);
        out.set("dupl", events.counts.duplications);
        out.set("mrca_type", events.mrca.code());
        out.set("dist", dist);
        out.set("ndist", dist / nfactor);
        Ok(out)
    }
}
