use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use tracing::{error, info};

use super::error::RemoteError;
use crate::verify;

/// One torrent as reported by the torrent client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRecord {
    pub name: String,
    /// Absolute path of the torrent's data on the remote host.
    pub base_path: String,
    pub label: Option<String>,
}

/// Remote torrent client API (list, move, label, fetch metadata).
///
/// Implementations own their HTTP transport and retry policy.
pub trait TorrentManager {
    /// All torrents keyed by info hash.
    fn list_torrents(&mut self) -> Result<BTreeMap<String, TorrentRecord>, RemoteError>;

    fn move_torrent(&mut self, hash: &str, target_path: &str) -> Result<(), RemoteError>;

    fn set_label(&mut self, hashes: &[String], label: &str) -> Result<(), RemoteError>;

    /// Downloads the `.torrent` file of `hash`, with its suggested file name.
    fn fetch_torrent_file(&mut self, hash: &str) -> Result<(Bytes, String), RemoteError>;
}

/// Picks the torrents whose data lives under `prefix`, keyed by the last
/// component of their data path.
pub fn select_by_path_prefix(
    torrents: &BTreeMap<String, TorrentRecord>,
    prefix: &str,
) -> BTreeMap<String, String> {
    torrents
        .iter()
        .filter(|(_, record)| record.base_path.starts_with(prefix))
        .map(|(hash, record)| {
            let base_name = record
                .base_path
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            info!(name = %base_name, %hash, "completed torrent found");
            (base_name, hash.clone())
        })
        .collect()
}

/// Outcome of [`settle`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettleReport {
    /// Hashes whose local data verified, then were moved and labelled.
    pub verified: Vec<String>,
    /// Hashes whose local data failed verification; left untouched remotely.
    pub failed: Vec<String>,
}

/// Verifies each torrent's mirrored data under `local_root` and, for those
/// that pass, moves them to `move_to` and applies `label`.
///
/// Verification failures are collected, not returned. A failed move is
/// logged and the torrent is still labelled. Fetching metadata and labelling
/// errors are returned.
pub fn settle<M: TorrentManager>(
    manager: &mut M,
    hashes: &[String],
    local_root: &Path,
    move_to: &str,
    label: &str,
) -> Result<SettleReport, RemoteError> {
    let mut report = SettleReport::default();

    for hash in hashes {
        let (metadata, file_name) = manager.fetch_torrent_file(hash)?;
        info!(%hash, file = %file_name, "verifying");

        match verify::verify_bytes(&metadata, local_root) {
            Ok(summary) => {
                info!(%hash, pieces = summary.pieces, bytes = summary.bytes, "verified");
                report.verified.push(hash.clone());
            }
            Err(err) => {
                error!(%hash, %err, "could not verify contents against piece hashes");
                report.failed.push(hash.clone());
            }
        }
    }

    for hash in &report.verified {
        info!(%hash, destination = move_to, "moving torrent");
        if let Err(err) = manager.move_torrent(hash, move_to) {
            error!(%hash, %err, "move failed");
        }
    }

    if !report.verified.is_empty() {
        info!(label, count = report.verified.len(), "setting label");
        manager.set_label(&report.verified, label)?;
    }

    Ok(report)
}
