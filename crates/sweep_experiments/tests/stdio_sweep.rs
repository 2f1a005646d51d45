#![cfg(unix)]

use sweep_core::{Parameter, SweepSpace};
use sweep_experiments::{
    export_to_csv, load_archive, run_sweep, save_archive, success_rate, StdioLink,
    StdioLinkConfig, SweepArchive, SweepConfig,
};
use tempfile::TempDir;

/// Shell stand-in for a model bridge: the flock is herded after one tick per sheep.
const SHELL_MODEL: &str = r#"
sheep=0
ticks=0
while read -r verb rest; do
  case "$verb" in
    command)
      case "$rest" in
        "set num-sheep "*) sheep=${rest#set num-sheep } ;;
        setup) ticks=0 ;;
        go) ticks=$((ticks + 1)) ;;
      esac
      echo ok ;;
    report)
      case "$rest" in
        "win? or ticks >= "*)
          max=${rest##* }
          if [ "$ticks" -ge "$sheep" ] || [ "$ticks" -ge "$max" ]; then
            echo "value true"
          else
            echo "value false"
          fi ;;
        ticks) echo "value $ticks" ;;
        *) echo "value 1.5" ;;
      esac ;;
    quit) exit 0 ;;
  esac
done
"#;

#[test]
fn test_sweep_over_child_processes() {
    let link = StdioLinkConfig::new("sh").arg("-c").arg(SHELL_MODEL);
    let config = SweepConfig::default()
        .with_workers(2)
        .with_max_ticks(6)
        .with_seed(7)
        .with_progress(false)
        .with_static_parameter("shepherd-model", "\"strombom\"");
    let mut space = SweepSpace::new()
        .parameter(Parameter::new("num-sheep", [3, 5, 8]))
        .parameter(Parameter::new("num-shepherds", [1, 2]));

    let table = run_sweep(&|_worker: usize| StdioLink::spawn(&link), &mut space, &config).unwrap();

    let ticks: Vec<u64> = table.records().map(|r| r.final_tick).collect();
    assert_eq!(ticks, vec![3, 3, 5, 5, 6, 6]);
    let won: Vec<bool> = table.records().map(|r| r.won).collect();
    assert_eq!(won, vec![true, true, true, true, false, false]);
    assert!(table.records().all(|r| r.final_max_spread == 1.5));

    let dir = TempDir::new().unwrap();
    let archive_path = dir.path().join("results.json");
    save_archive(&archive_path, &SweepArchive::new(&space, table.clone())).unwrap();
    export_to_csv(&table, dir.path().join("results.csv")).unwrap();

    let restored = load_archive(&archive_path).unwrap();
    assert_eq!(restored.table, table);
    assert_eq!(restored.parameters.len(), 2);

    let surface = success_rate(&restored.table, &["num-sheep"]).unwrap();
    let rates: Vec<f64> = surface.iter().map(|p| p.success_rate).collect();
    assert_eq!(rates, vec![1.0, 1.0, 0.0]);
    assert!(surface.iter().all(|p| p.trials == 2));
}
