use std::fmt::Write as _;

use cmdplan_core::api::{Command, Meta, Plan, SeriesItem};

/// Human-readable outline of a resolved plan.
pub fn render_outline(plan: &Plan) -> String {
    let mut out = String::new();

    for (idx, item) in plan.series.iter().enumerate() {
        match item {
            SeriesItem::Single(cmd) => {
                let _ = writeln!(out, "{}. {}", idx + 1, describe(cmd));
            }
            SeriesItem::Parallel(cmds) => {
                let _ = writeln!(out, "{}. parallel ({})", idx + 1, cmds.len());
                for cmd in cmds {
                    let _ = writeln!(out, "   - {}", describe(cmd));
                }
            }
        }
    }

    if !plan.parallel.is_empty() {
        let _ = writeln!(out, "then parallel ({})", plan.parallel.len());
        for cmd in &plan.parallel {
            let _ = writeln!(out, "   - {}", describe(cmd));
        }
    }

    let _ = write!(
        out,
        "{} steps, {} commands",
        plan.step_count(),
        plan.command_count()
    );
    out
}

fn describe(cmd: &Command) -> String {
    let meta = describe_meta(&cmd.meta);
    if meta.is_empty() {
        cmd.cmd.clone()
    } else {
        format!("{}  [{}]", cmd.cmd, meta)
    }
}

fn describe_meta(meta: &Meta) -> String {
    let fields = [
        ("dir", &meta.working_dir),
        ("out", &meta.out_file),
        ("err", &meta.err_file),
    ];
    fields
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={}", v.display())))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdplan_core::plan::decode_str;

    #[test]
    fn test_outline_lists_steps_and_meta() {
        let plan = decode_str(
            r#"
meta:
  working_dir: /srv
series:
  - echo a
  - - echo b
    - cmd: echo c
parallel:
  - echo d
"#,
        )
        .unwrap();

        let outline = render_outline(&plan);

        assert_eq!(
            outline,
            "1. echo a  [dir=/srv]\n\
             2. parallel (2)\n   - echo b  [dir=/srv]\n   - echo c\n\
             then parallel (1)\n   - echo d  [dir=/srv]\n\
             3 steps, 4 commands"
        );
    }
}
