use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

/// Inheritable execution attributes of a plan node.
///
/// `None` means "use the process default": the current directory for
/// `working_dir`, the console alone for `out_file` and `err_file`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "non_empty_path")]
    pub working_dir: Option<PathBuf>,

    #[serde(default, deserialize_with = "non_empty_path")]
    pub out_file: Option<PathBuf>,

    #[serde(default, deserialize_with = "non_empty_path")]
    pub err_file: Option<PathBuf>,
}

fn non_empty_path<'de, D>(de: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
}

impl Meta {
    /// Fill every unset field from `parent`. Set fields are never touched.
    pub fn inherit_from(&self, parent: &Meta) -> Meta {
        Meta {
            working_dir: self
                .working_dir
                .clone()
                .or_else(|| parent.working_dir.clone()),
            out_file: self.out_file.clone().or_else(|| parent.out_file.clone()),
            err_file: self.err_file.clone().or_else(|| parent.err_file.clone()),
        }
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.working_dir.is_none() && self.out_file.is_none() && self.err_file.is_none()
    }
}

/// A leaf shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub cmd: String,
    pub meta: Meta,
    /// Whether unset metadata is taken from the enclosing node.
    pub inherits: bool,
}

impl Command {
    /// A bare command string: no metadata of its own, inherits everything.
    pub fn inheriting(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            meta: Meta::default(),
            inherits: true,
        }
    }

    pub fn with_meta(cmd: impl Into<String>, meta: Meta, inherits: bool) -> Self {
        Self {
            cmd: cmd.into(),
            meta,
            inherits,
        }
    }

    /// Resolve metadata against `parent` when this command inherits.
    pub fn resolved(mut self, parent: &Meta) -> Self {
        if self.inherits {
            self.meta = self.meta.inherit_from(parent);
        }
        self
    }
}

/// One step of the top-level series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesItem {
    Single(Command),
    /// Non-empty group of commands run through the bounded scheduler.
    Parallel(Vec<Command>),
}

impl SeriesItem {
    pub fn commands(&self) -> &[Command] {
        match self {
            Self::Single(cmd) => std::slice::from_ref(cmd),
            Self::Parallel(cmds) => cmds,
        }
    }
}

/// A decoded task plan with all metadata inheritance resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub meta: Meta,
    pub series: Vec<SeriesItem>,
    /// Top-level group, run after every series item succeeded.
    pub parallel: Vec<Command>,
}

impl Plan {
    /// Number of scheduling steps: every series item plus the top-level group.
    pub fn step_count(&self) -> usize {
        self.series.len() + usize::from(!self.parallel.is_empty())
    }

    pub fn command_count(&self) -> usize {
        self.series
            .iter()
            .map(|item| item.commands().len())
            .sum::<usize>()
            + self.parallel.len()
    }
}
