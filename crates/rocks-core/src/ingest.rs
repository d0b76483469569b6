//! Snapshot ingestion.
//!
//! A [`SnapshotSource`] lists and loads per-channel status feeds.
//! [`load_snapshots`] fetches every listed snapshot concurrently and returns
//! them in merge order: distribution by [`distro_order`], then channel name.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rocks_model::{distro_order, ChannelSnapshot, PackageSnapshot};
use tokio::task::JoinSet;
use tracing::{debug, Instrument};

use crate::error::{Result, RocksError};
use crate::metrics::METRICS;
use crate::obs::{emit_snapshot_loaded, emit_snapshot_skipped};

/// Suffix of snapshot files in a cache directory.
pub const SNAPSHOT_SUFFIX: &str = "yaml";

/// Identifies one snapshot within a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId {
    pub distro: String,
    pub channel: String,
    /// Source-specific location, e.g. a file path.
    pub locator: String,
}

impl SnapshotId {
    pub fn new(
        distro: impl Into<String>,
        channel: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            distro: distro.into(),
            channel: channel.into(),
            locator: locator.into(),
        }
    }

    /// Parse a `<prefix>_<distro>_<channel>` file stem.
    ///
    /// Returns `None` unless the stem has exactly three parts.
    pub fn from_file_stem(stem: &str, locator: impl Into<String>) -> Option<Self> {
        let mut parts = stem.split('_');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(distro), Some(channel), None) => {
                Some(Self::new(distro, channel, locator))
            }
            _ => None,
        }
    }

    /// Merge order: distribution first, then channel.
    pub fn merge_order(&self, other: &Self) -> Ordering {
        distro_order(&self.distro, &other.distro).then_with(|| self.channel.cmp(&other.channel))
    }
}

/// Parse one status feed: a mapping from package name to package entry.
///
/// An empty document is an empty snapshot.
pub fn parse_snapshot(id: &SnapshotId, text: &str) -> Result<ChannelSnapshot> {
    let packages: Option<BTreeMap<String, PackageSnapshot>> = if text.trim().is_empty() {
        None
    } else {
        serde_yaml::from_str(text).map_err(|source| RocksError::SnapshotParse {
            locator: id.locator.clone(),
            source,
        })?
    };

    Ok(ChannelSnapshot {
        distro: id.distro.clone(),
        channel: id.channel.clone(),
        packages: packages.unwrap_or_default(),
    })
}

/// Injectable supplier of channel snapshots.
///
/// Implement this trait for a cache directory, an in-memory fixture, or any
/// other store that already holds downloaded feeds.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable location, used to tag log output.
    fn location(&self) -> String;

    /// Enumerate the snapshots this source can load.
    async fn list(&self) -> Result<Vec<SnapshotId>>;

    /// Load one listed snapshot.
    async fn load(&self, id: &SnapshotId) -> Result<ChannelSnapshot>;
}

/// Snapshots stored as `*yaml` files in a local cache directory.
#[derive(Debug, Clone)]
pub struct CacheDirSource {
    dir: PathBuf,
}

impl CacheDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SnapshotSource for CacheDirSource {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    async fn list(&self) -> Result<Vec<SnapshotId>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_snapshot = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(SNAPSHOT_SUFFIX));
            if !is_snapshot || !entry.file_type().await?.is_file() {
                continue;
            }

            let locator = path.display().to_string();
            let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
            match SnapshotId::from_file_stem(stem, locator.as_str()) {
                Some(id) => ids.push(id),
                None => emit_snapshot_skipped(&locator, "stem is not <prefix>_<distro>_<channel>"),
            }
        }
        ids.sort_by(SnapshotId::merge_order);
        Ok(ids)
    }

    async fn load(&self, id: &SnapshotId) -> Result<ChannelSnapshot> {
        let text = tokio::fs::read_to_string(&id.locator).await?;
        parse_snapshot(id, &text)
    }
}

/// Fixed set of snapshots held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotSource {
    snapshots: Vec<ChannelSnapshot>,
}

impl MemorySnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, snapshot: ChannelSnapshot) -> Self {
        self.snapshots.push(snapshot);
        self
    }

    pub fn insert(&mut self, snapshot: ChannelSnapshot) {
        self.snapshots.push(snapshot);
    }
}

impl FromIterator<ChannelSnapshot> for MemorySnapshotSource {
    fn from_iter<I: IntoIterator<Item = ChannelSnapshot>>(iter: I) -> Self {
        Self {
            snapshots: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl SnapshotSource for MemorySnapshotSource {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn list(&self) -> Result<Vec<SnapshotId>> {
        let mut ids: Vec<SnapshotId> = self
            .snapshots
            .iter()
            .enumerate()
            .map(|(idx, s)| SnapshotId::new(&s.distro, &s.channel, format!("memory:{idx}")))
            .collect();
        ids.sort_by(SnapshotId::merge_order);
        Ok(ids)
    }

    async fn load(&self, id: &SnapshotId) -> Result<ChannelSnapshot> {
        id.locator
            .strip_prefix("memory:")
            .and_then(|idx| idx.parse::<usize>().ok())
            .and_then(|idx| self.snapshots.get(idx))
            .cloned()
            .ok_or_else(|| RocksError::Source(format!("unknown snapshot '{}'", id.locator)))
    }
}

/// Load every snapshot `source` lists, concurrently, in merge order.
pub async fn load_snapshots(source: Arc<dyn SnapshotSource>) -> Result<Vec<ChannelSnapshot>> {
    let span = tracing::info_span!("rocks.load", source = %source.location());
    load_all(source).instrument(span).await
}

async fn load_all(source: Arc<dyn SnapshotSource>) -> Result<Vec<ChannelSnapshot>> {
    let mut ids = source.list().await?;
    ids.sort_by(SnapshotId::merge_order);
    debug!(snapshots = ids.len(), "listed snapshots");

    let mut join_set = JoinSet::new();
    for (idx, id) in ids.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        join_set.spawn(async move {
            let snapshot = source.load(&id).await?;
            Ok::<(usize, ChannelSnapshot), RocksError>((idx, snapshot))
        });
    }

    let mut ordered: Vec<Option<ChannelSnapshot>> = vec![None; ids.len()];
    while let Some(joined) = join_set.join_next().await {
        let (idx, snapshot) = joined
            .map_err(|e| RocksError::Source(format!("snapshot load task join error: {e}")))??;
        emit_snapshot_loaded(&snapshot.distro, &snapshot.channel, snapshot.packages.len());
        METRICS.inc_snapshots_loaded();
        ordered[idx] = Some(snapshot);
    }

    ids.iter()
        .zip(ordered)
        .map(|(id, slot)| {
            slot.ok_or_else(|| {
                RocksError::Source(format!("missing load result for '{}'", id.locator))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_needs_three_parts() {
        let id = SnapshotId::from_file_stem("ros_noetic_default", "x").unwrap();
        assert_eq!(id.distro, "noetic");
        assert_eq!(id.channel, "default");

        assert!(SnapshotId::from_file_stem("noetic_default", "x").is_none());
        assert!(SnapshotId::from_file_stem("ros_noetic_default_extra", "x").is_none());
    }

    #[test]
    fn test_merge_order_puts_legacy_distros_first() {
        let mut ids = vec![
            SnapshotId::new("humble", "a", ""),
            SnapshotId::new("noetic", "z", ""),
            SnapshotId::new("noetic", "b", ""),
        ];
        ids.sort_by(SnapshotId::merge_order);
        let order: Vec<(&str, &str)> = ids
            .iter()
            .map(|id| (id.distro.as_str(), id.channel.as_str()))
            .collect();
        assert_eq!(order, vec![("noetic", "b"), ("noetic", "z"), ("humble", "a")]);
    }

    #[test]
    fn test_parse_empty_document() {
        let id = SnapshotId::new("noetic", "default", "empty.yaml");
        let snapshot = parse_snapshot(&id, "\n").unwrap();
        assert!(snapshot.packages.is_empty());
        assert_eq!(snapshot.channel, "default");
    }

    #[test]
    fn test_parse_error_carries_locator() {
        let id = SnapshotId::new("noetic", "default", "broken.yaml");
        let err = parse_snapshot(&id, "roscpp: [unterminated").unwrap_err();
        match err {
            RocksError::SnapshotParse { locator, .. } => assert_eq!(locator, "broken.yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_memory_source_round_trips_snapshots() {
        let source = MemorySnapshotSource::new()
            .with(ChannelSnapshot::new("humble", "main"))
            .with(ChannelSnapshot::new("noetic", "main"));
        let loaded = load_snapshots(Arc::new(source)).await.unwrap();
        let distros: Vec<&str> = loaded.iter().map(|s| s.distro.as_str()).collect();
        assert_eq!(distros, vec!["noetic", "humble"]);
    }

    #[tokio::test]
    async fn test_memory_source_rejects_unknown_locator() {
        let source = MemorySnapshotSource::new();
        let err = source
            .load(&SnapshotId::new("noetic", "main", "memory:3"))
            .await
            .unwrap_err();
        assert!(matches!(err, RocksError::Source(_)));
    }
}
