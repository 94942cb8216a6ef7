use std::path::{Path, PathBuf};

use cmdplan_core::api::{Plan, PlanRunner, RunOpts};
use cmdplan_core::plan::decode_str;

/// Decode `yaml` after replacing `{dir}` with the scratch directory.
pub fn plan_in(dir: &Path, yaml: &str) -> Plan {
    let yaml = yaml.replace("{dir}", &dir.display().to_string());
    decode_str(&yaml).expect("plan should decode")
}

pub fn write_plan(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("cmds.yml");
    let yaml = yaml.replace("{dir}", &dir.display().to_string());
    std::fs::write(&path, yaml).expect("write plan");
    path
}

pub fn runner(max_parallel: usize) -> PlanRunner {
    PlanRunner::new(RunOpts {
        max_parallel,
        ..RunOpts::default()
    })
}

/// Lines of a file, empty when it does not exist.
pub fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
