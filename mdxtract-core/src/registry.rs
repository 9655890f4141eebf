//! Per-run bookkeeping of canonical titles, sequence numbers and output names.

use crate::title::CanonicalTitle;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// What happens when two source files share a canonical title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep both: the later file gets `<seq>-<title>_<k>.mdx`.
    #[default]
    AppendSuffix,
    /// Keep only the most recent file for each title.
    LastWriterWins,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::AppendSuffix => f.write_str("append-suffix"),
            CollisionPolicy::LastWriterWins => f.write_str("last-writer-wins"),
        }
    }
}

/// Where the next file for a title should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// First occurrence of the title in this run.
    Fresh { seq: u32, file_name: String },
    /// Repeat under [`CollisionPolicy::AppendSuffix`].
    Suffixed {
        seq: u32,
        suffix: u32,
        file_name: String,
    },
    /// Repeat under [`CollisionPolicy::LastWriterWins`]; `previous` is the
    /// output to delete first, if one survives.
    Replace {
        seq: u32,
        file_name: String,
        previous: Option<String>,
    },
}

impl Slot {
    pub fn file_name(&self) -> &str {
        match self {
            Slot::Fresh { file_name, .. }
            | Slot::Suffixed { file_name, .. }
            | Slot::Replace { file_name, .. } => file_name,
        }
    }

    pub fn seq(&self) -> u32 {
        match self {
            Slot::Fresh { seq, .. } | Slot::Suffixed { seq, .. } | Slot::Replace { seq, .. } => {
                *seq
            }
        }
    }
}

#[derive(Debug, Clone)]
struct TitleEntry {
    seq: u32,
    output: Option<String>,
}

/// Maps each canonical title to its sequence number for the lifetime of one
/// extraction run.
///
/// Planning is side-effect free; the registry only changes when a write is
/// committed, so a skipped or failed file never consumes a sequence number.
#[derive(Debug)]
pub struct Registry {
    policy: CollisionPolicy,
    numbered: bool,
    next_seq: u32,
    titles: HashMap<CanonicalTitle, TitleEntry>,
    written: HashSet<String>,
}

impl Registry {
    /// `numbered` only affects [`CollisionPolicy::LastWriterWins`]; suffixed
    /// output is always numbered.
    pub fn new(policy: CollisionPolicy, numbered: bool) -> Self {
        Self {
            policy,
            numbered: numbered || policy == CollisionPolicy::AppendSuffix,
            next_seq: 1,
            titles: HashMap::new(),
            written: HashSet::new(),
        }
    }

    fn base_name(&self, seq: u32, title: &CanonicalTitle) -> String {
        if self.numbered {
            format!("{}-{}", seq, title)
        } else {
            title.to_string()
        }
    }

    pub fn plan(&self, title: &CanonicalTitle) -> Slot {
        let Some(entry) = self.titles.get(title) else {
            let seq = self.next_seq;
            return Slot::Fresh {
                seq,
                file_name: format!("{}.mdx", self.base_name(seq, title)),
            };
        };

        let base = self.base_name(entry.seq, title);
        match self.policy {
            CollisionPolicy::AppendSuffix => {
                let mut suffix = 1;
                let mut file_name = format!("{}_{}.mdx", base, suffix);
                while self.written.contains(&file_name) {
                    suffix += 1;
                    file_name = format!("{}_{}.mdx", base, suffix);
                }
                Slot::Suffixed {
                    seq: entry.seq,
                    suffix,
                    file_name,
                }
            }
            CollisionPolicy::LastWriterWins => Slot::Replace {
                seq: entry.seq,
                file_name: format!("{}.mdx", base),
                previous: entry.output.clone(),
            },
        }
    }

    /// Record a successful write for `slot`.
    pub fn commit(&mut self, title: &CanonicalTitle, slot: &Slot) {
        let file_name = slot.file_name().to_string();
        match slot {
            Slot::Fresh { seq, .. } => {
                self.titles.insert(
                    title.clone(),
                    TitleEntry {
                        seq: *seq,
                        output: Some(file_name.clone()),
                    },
                );
                self.next_seq = seq + 1;
            }
            Slot::Suffixed { .. } => {}
            Slot::Replace { .. } => {
                if let Some(entry) = self.titles.get_mut(title) {
                    entry.output = Some(file_name.clone());
                }
            }
        }
        self.written.insert(file_name);
    }

    /// Record that the surviving output for `title` was deleted.
    pub fn forget_output(&mut self, title: &CanonicalTitle) {
        if let Some(entry) = self.titles.get_mut(title) {
            if let Some(name) = entry.output.take() {
                self.written.remove(&name);
            }
        }
    }

    /// Whether this run wrote `file_name`.
    pub fn was_written(&self, file_name: &str) -> bool {
        self.written.contains(file_name)
    }
}
