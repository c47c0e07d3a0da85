use cladenorm::analysis::AnalysisError;
use cladenorm::pipeline::{Mode, PipelineError, RunConfig, TargetGroup, TreeFilter, run};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GROUPS: &str = "\
Proteome,Normalising group,Vertebrate
HUMAN,A,vertebrate
MOUSE,A,vertebrate
FROG,A,vertebrate
FLY,B,invertebrate
YEAST,C,fungus
";

const AGES: &str = "\
# phylome\tspecies\tage
0076\tYEAST\t4
0076\tFLY\t2
0076\tHUMAN\t0
";

const SEED_TREE: &str = "g1_HUMAN\t1\tJTT\t(((g1_HUMAN:1,g2_MOUSE:1):1,g3_FROG:2):1,(g4_FLY:3,g5_YEAST:4):1);";
const OVERFLOW_TREE: &str = "g8_HUMAN\t1\tJTT\t((g8_HUMAN:1e308,g9_MOUSE:1):1e308,(g10_FLY:1,g11_YEAST:1):1e308);";
const BROKEN_TREE: &str = "g6_MOUSE\t1\tJTT\t((g6_MOUSE:1,g7_FLY:1);";

fn setup(batch_name: &str, lines: &[&str], mode: Mode) -> (TempDir, RunConfig) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join(batch_name);
    fs::write(&input, lines.join("\n")).unwrap();
    fs::write(dir.path().join("groups.csv"), GROUPS).unwrap();
    fs::write(dir.path().join("ages.tsv"), AGES).unwrap();

    let config = RunConfig {
        input,
        groups: dir.path().join("groups.csv"),
        ages: Some(dir.path().join("ages.tsv")),
        output_dir: dir.path().join("out"),
        workers: 2,
        mode,
        targets: vec![TargetGroup::new("vert", "Vertebrate", "vertebrate")],
        filter: TreeFilter {
            enabled: false,
            ..TreeFilter::default()
        },
        ..RunConfig::default()
    };
    (dir, config)
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn test_clade_distance_run_writes_one_record_per_tree() {
    let (_dir, config) = setup("0076_batch.txt", &[SEED_TREE], Mode::CladeDistance);
    let summary = run(&config).unwrap();

    assert_eq!(summary.processed, 1);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.outputs, vec![config.output_dir.join("0076_batch_dist.csv")]);

    let lines = read_lines(&summary.outputs[0]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("seed,species,vert_dist,seed_dist,vert_ndist,seed_ndist,nfactor,norm_leafno"));
    assert!(lines[0].ends_with("whole_D,whole_S"));
    assert!(lines[1].starts_with("g1_HUMAN,HUMAN,2,"));
}

#[test]
fn test_pairwise_run_writes_pairs_and_norm() {
    let bare = "((g1_HUMAN:1,g2_MOUSE:1):1,(g3_FROG:1,g4_YEAST:5):1);";
    let (_dir, config) = setup("0076_pairs.txt", &[bare], Mode::Pairwise);
    let summary = run(&config).unwrap();
    assert_eq!(summary.outputs.len(), 2);

    let pairs = read_lines(&summary.outputs[0]);
    assert_eq!(pairs[0], "id,tree,from,from_sp,to,to_sp,sp,dupl,mrca_type,dist,ndist");
    assert_eq!(pairs.len(), 7);
    assert!(pairs[1].starts_with("0076,sp,g1_HUMAN,HUMAN,g2_MOUSE,MOUSE,"));

    let norm = read_lines(&summary.outputs[1]);
    assert_eq!(norm[0], "tree,leafno,median,mean,width,sum,kurt,skew");
    assert!(norm[1].starts_with("sp,3,"));
}

#[test]
fn test_pairwise_filter_rejects_small_trees() {
    let bare = "((g1_HUMAN:1,g2_MOUSE:1):1,(g3_FROG:1,g4_YEAST:5):1);";
    let (_dir, mut config) = setup("0076_pairs.txt", &[bare], Mode::Pairwise);
    config.filter.enabled = true;
    let summary = run(&config).unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.filtered, 1);
}

#[test]
fn test_existing_outputs_are_kept_unless_forced() {
    let (_dir, mut config) = setup("0076_batch.txt", &[SEED_TREE], Mode::CladeDistance);
    assert!(!run(&config).unwrap().skipped);

    let second = run(&config).unwrap();
    assert!(second.skipped);
    assert_eq!(second.processed, 0);

    config.force = true;
    let forced = run(&config).unwrap();
    assert!(!forced.skipped);
    assert_eq!(forced.processed, 1);
}

#[test]
fn test_failing_tree_is_reported() {
    let (_dir, config) = setup("0076_batch.txt", &[SEED_TREE, BROKEN_TREE], Mode::CladeDistance);
    let summary = run(&config).unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].seed, "g6_MOUSE");
    assert!(matches!(summary.failures[0].error, PipelineError::Parse { .. }));
    assert_eq!(read_lines(&summary.outputs[0]).len(), 2);
}

#[test]
fn test_overflowing_tree_does_not_drop_the_batch() {
    let other_seed = SEED_TREE.replacen("g1_HUMAN", "g2_MOUSE", 1);
    let (_dir, config) = setup(
        "0076_batch.txt",
        &[SEED_TREE, OVERFLOW_TREE, other_seed.as_str()],
        Mode::CladeDistance,
    );
    let summary = run(&config).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].seed, "g8_HUMAN");
    assert!(matches!(
        summary.failures[0].error,
        PipelineError::Analysis {
            source: AnalysisError::InvalidBranchLength(_),
            ..
        }
    ));

    let mut seeds: Vec<String> = read_lines(&summary.outputs[0])[1..]
        .iter()
        .map(|line| line.split(',').next().unwrap().to_string())
        .collect();
    seeds.sort();
    assert_eq!(seeds, ["g1_HUMAN", "g2_MOUSE"]);
}

#[test]
fn test_strict_mode_fails_after_writing() {
    let (_dir, mut config) = setup("0076_batch.txt", &[SEED_TREE, BROKEN_TREE], Mode::CladeDistance);
    config.strict = true;
    assert!(matches!(run(&config), Err(PipelineError::TreeFailures(1))));
    assert!(config.output_paths()[0].exists());
}

#[test]
fn test_unknown_phylome() {
    let (_dir, mut config) = setup("0076_batch.txt", &[SEED_TREE], Mode::CladeDistance);
    config.phylome = Some("0099".to_string());
    assert!(matches!(run(&config), Err(PipelineError::UnknownPhylome(id)) if id == "0099"));
}

#[test]
fn test_invalid_config_is_rejected_before_reading() {
    let (_dir, mut config) = setup("0076_batch.txt", &[SEED_TREE], Mode::CladeDistance);
    config.workers = 0;
    assert!(matches!(run(&config), Err(PipelineError::InvalidConfig(_))));
}
