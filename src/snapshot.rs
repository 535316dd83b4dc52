// LINKPOWER: Energy Savings of Link Sleeping and Rate Adaptation in Backbone Networks
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Parser for the network snapshots.
//!
//! A snapshot is a YAML mapping from the name of a source host to the links leaving it:
//!
//! ```yaml
//! fra-fr5-sbb1-nc5:
//!   links:
//!     - peer: rbx-g1-nc5
//!       load: 12.5
//!       label: 1
//! ```
//!
//! The timestamp of a snapshot is the third `_`-separated segment of its file name, e.g.
//! `europe_weathermap_1606780800.yaml`.

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::config::InternalNaming;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("No timestamp in the file name of {0:?}")]
    MissingTimestamp(PathBuf),
}

/// One directed link as listed under its source host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkEntry {
    pub peer: String,
    /// Load in Gbps.
    pub load: f64,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostEntry {
    #[serde(default, deserialize_with = "deserialize_links")]
    pub links: Vec<LinkEntry>,
}

/// Labels are numbers in most snapshots, but strings in some.
fn deserialize_label<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        other => {
            return Err(serde::de::Error::custom(format!(
                "unexpected link label: {other:?}"
            )))
        }
    })
}

fn deserialize_links<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<LinkEntry>, D::Error> {
    Ok(Option::<Vec<LinkEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

lazy_static! {
    static ref TIMESTAMP: Regex = Regex::new(r"^(?:[^_]*_){2}(?P<timestamp>[0-9]+)(?:_|$)").unwrap();
}

/// Extract the timestamp embedded in the file name of a snapshot.
pub fn timestamp_from_path(path: impl AsRef<Path>) -> Result<i64, SnapshotError> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    TIMESTAMP
        .captures(&stem)
        .and_then(|c| c["timestamp"].parse().ok())
        .ok_or_else(|| SnapshotError::MissingTimestamp(path.to_path_buf()))
}

/// State of the network at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub timestamp: i64,
    pub hosts: BTreeMap<String, HostEntry>,
}

impl Snapshot {
    pub fn parse(timestamp: i64, content: &str) -> Result<Self, SnapshotError> {
        Ok(Self {
            timestamp,
            hosts: serde_yaml::from_str(content)?,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let timestamp = timestamp_from_path(path.as_ref())?;
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(timestamp, &content)
    }

    /// All directed links as `(source, entry)`, in the order of the file.
    pub fn links(&self) -> impl Iterator<Item = (&str, &LinkEntry)> {
        self.hosts
            .iter()
            .flat_map(|(src, host)| host.links.iter().map(move |link| (src.as_str(), link)))
    }

    /// Fold the directed links into one load per identity.
    ///
    /// Entries sharing an identity have their loads summed. With [`LinkKeying::Labelled`], such a
    /// collision means the dataset assigned the same label to distinct links; every extra
    /// occurrence is recorded in [`Observations::duplicates`]. With [`LinkKeying::HostPair`],
    /// collisions are just parallel links between the same hosts.
    pub fn observations(&self, keying: LinkKeying) -> Observations {
        let mut observations = Observations {
            timestamp: self.timestamp,
            ..Default::default()
        };

        for (src, link) in self.links() {
            let id = LinkId {
                src: src.to_string(),
                dst: link.peer.clone(),
                label: match keying {
                    LinkKeying::HostPair => None,
                    LinkKeying::Labelled => link.label.clone(),
                },
            };
            let entry = observations.loads.entry(id.clone()).or_default();
            if entry.entries > 0 && keying == LinkKeying::Labelled {
                log::trace!("duplicate link {id} at {}", self.timestamp);
                observations.duplicates.push(id);
            }
            entry.entries += 1;
            entry.load += link.load;
        }

        observations
    }
}

/// Which parts of a directed link make up its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKeying {
    /// `(source, destination)`: all parallel links between two hosts are folded together.
    HostPair,
    /// `(source, destination, label)`: each physical link on its own.
    Labelled,
}

/// Identity of a directed link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId {
    pub src: String,
    pub dst: String,
    pub label: Option<String>,
}

impl LinkId {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            label: label.map(str::to_string),
        }
    }

    /// The same physical link in the reverse direction.
    pub fn mirror(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
            label: self.label.clone(),
        }
    }

    pub fn is_internal(&self, naming: &InternalNaming) -> bool {
        naming.is_internal_link(&self.src, &self.dst)
    }
}

/// Percent-encode the characters that would make a link name ambiguous or unusable as a file
/// name.
fn escape(part: &str) -> Cow<'_, str> {
    if !part.contains(['%', '_', '/', '\\']) {
        return Cow::Borrowed(part);
    }
    let mut escaped = String::with_capacity(part.len() + 4);
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '_' => escaped.push_str("%5F"),
            '/' => escaped.push_str("%2F"),
            '\\' => escaped.push_str("%5C"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// `<src>_<dst>_<label>`, or `<src>_<dst>` without a label. Each part is escaped, so distinct
/// identities never share a name.
impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", escape(&self.src), escape(&self.dst))?;
        if let Some(label) = &self.label {
            write!(f, "_{}", escape(label))?;
        }
        Ok(())
    }
}

/// Summed load of all entries sharing an identity in one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinkLoad {
    /// Number of entries folded into this identity.
    pub entries: usize,
    pub load: f64,
}

/// Directed link loads of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Observations {
    pub timestamp: i64,
    pub loads: BTreeMap<LinkId, LinkLoad>,
    /// One entry per extra occurrence of a labelled identity.
    pub duplicates: Vec<LinkId>,
}

impl Observations {
    pub fn get(&self, id: &LinkId) -> Option<&LinkLoad> {
        self.loads.get(id)
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TWO_HOSTS: &str = "
A:
  links:
    - peer: B
      load: 60
      label: 1
B:
  links:
    - peer: A
      load: 80.5
      label: 1
";

    #[test]
    fn parse() {
        let snapshot = Snapshot::parse(42, TWO_HOSTS).unwrap();
        assert_eq!(snapshot.hosts.len(), 2);
        assert_eq!(
            snapshot.hosts["A"].links[0],
            LinkEntry {
                peer: "B".to_string(),
                load: 60.0,
                label: Some("1".to_string())
            }
        );
        assert_eq!(snapshot.links().count(), 2);
    }

    #[test]
    fn parse_string_labels_and_empty_hosts() {
        let snapshot = Snapshot::parse(
            0,
            "
A:
  links:
    - {peer: B, load: 1.5, label: 'x-1'}
B:
  links:
C: {}
",
        )
        .unwrap();
        assert_eq!(snapshot.hosts["A"].links[0].label.as_deref(), Some("x-1"));
        assert!(snapshot.hosts["B"].links.is_empty());
        assert!(snapshot.hosts["C"].links.is_empty());
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            Snapshot::parse(0, "A: [this is: not"),
            Err(SnapshotError::Yaml(_))
        ));
        assert!(matches!(
            Snapshot::parse(0, "A:\n  links:\n    - peer: B\n"),
            Err(SnapshotError::Yaml(_))
        ));
    }

    #[test]
    fn timestamps() {
        assert_eq!(
            timestamp_from_path("europe/europe_weathermap_1606780800.yaml").unwrap(),
            1606780800
        );
        assert_eq!(timestamp_from_path("a_b_12_c.yml").unwrap(), 12);
        assert!(timestamp_from_path("a_b_c.yaml").is_err());
        assert!(timestamp_from_path("a_12.yaml").is_err());
        assert!(timestamp_from_path("a_b_12x.yaml").is_err());
    }

    #[test]
    fn duplicates_are_summed() {
        let snapshot = Snapshot::parse(
            7,
            "
A:
  links:
    - {peer: B, load: 10, label: 1}
    - {peer: B, load: 20, label: 1}
    - {peer: B, load: 30, label: 1}
    - {peer: B, load: 5, label: 2}
",
        )
        .unwrap();

        let labelled = snapshot.observations(LinkKeying::Labelled);
        let id = LinkId::new("A", "B", Some("1"));
        assert_eq!(labelled.len(), 2);
        assert_eq!(
            labelled.get(&id),
            Some(&LinkLoad {
                entries: 3,
                load: 60.0
            })
        );
        assert_eq!(labelled.duplicates, vec![id.clone(), id]);

        let pairs = snapshot.observations(LinkKeying::HostPair);
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            pairs.get(&LinkId::new("A", "B", None)),
            Some(&LinkLoad {
                entries: 4,
                load: 65.0
            })
        );
        assert!(pairs.duplicates.is_empty());
    }

    #[test]
    fn link_ids() {
        let id = LinkId::new("A", "b", Some("3"));
        assert_eq!(id.to_string(), "A_b_3");
        assert_eq!(id.mirror().to_string(), "b_A_3");
        assert_eq!(id.mirror().mirror(), id);
        assert_eq!(LinkId::new("a", "b", None).to_string(), "a_b");
        assert!(!id.is_internal(&InternalNaming::LowercaseLeading));
        assert!(id.mirror().label.is_some());
    }

    #[test]
    fn link_names_are_unambiguous() {
        let a = LinkId::new("a_b", "c", Some("x/../y"));
        let b = LinkId::new("a", "b_c", Some("x/../y"));
        assert_eq!(a.to_string(), "a%5Fb_c_x%2F..%2Fy");
        assert_eq!(b.to_string(), "a_b%5Fc_x%2F..%2Fy");
        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(LinkId::new("50%", "c\\d", None).to_string(), "50%25_c%5Cd");
    }
}
