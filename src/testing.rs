//! Fixtures shared by the unit tests: a small bencode writer, torrent
//! builders and an in-memory remote backed by a local directory.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use sha1::{Digest, Sha1};

use crate::mirror::CancelToken;
use crate::remote::{
    join_remote, ConnectParams, Connector, FileAttributes, RangedRead, RemoteError, RemoteSession,
};

// ============================================================================
// Bencode
// ============================================================================

/// Bencode value for building test input.
#[derive(Debug, Clone)]
pub(crate) enum Bencode {
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Bencode>),
    Dict(Vec<(Vec<u8>, Bencode)>),
}

impl Bencode {
    pub(crate) fn str(s: &str) -> Self {
        Bencode::Bytes(s.as_bytes().to_vec())
    }

    pub(crate) fn dict(entries: Vec<(&str, Bencode)>) -> Self {
        Bencode::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.as_bytes().to_vec(), v))
                .collect(),
        )
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Bencode::Int(n) => out.extend_from_slice(format!("i{n}e").as_bytes()),
            Bencode::Bytes(b) => {
                out.extend_from_slice(format!("{}:", b.len()).as_bytes());
                out.extend_from_slice(b);
            }
            Bencode::List(items) => {
                out.push(b'l');
                for item in items {
                    item.encode_into(out);
                }
                out.push(b'e');
            }
            Bencode::Dict(entries) => {
                let mut sorted: Vec<_> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                out.push(b'd');
                for (key, value) in sorted {
                    Bencode::Bytes(key.clone()).encode_into(out);
                    value.encode_into(out);
                }
                out.push(b'e');
            }
        }
    }
}

// ============================================================================
// Torrents
// ============================================================================

pub(crate) fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::rng().fill(&mut data[..]);
    data
}

/// Concatenated SHA-1 digests of `data` cut into `piece_length` pieces.
pub(crate) fn piece_hashes(data: &[u8], piece_length: usize) -> Vec<u8> {
    data.chunks(piece_length)
        .flat_map(|piece| Sha1::digest(piece).to_vec())
        .collect()
}

/// Metainfo for a multi-file torrent. File paths use `/` between segments.
pub(crate) fn multi_file_torrent(
    name: &str,
    files: &[(&str, &[u8])],
    piece_length: usize,
) -> Vec<u8> {
    let content: Vec<u8> = files.iter().flat_map(|(_, data)| data.iter().copied()).collect();
    let entries = files
        .iter()
        .map(|(path, data)| {
            Bencode::dict(vec![
                ("length", Bencode::Int(data.len() as i64)),
                (
                    "path",
                    Bencode::List(path.split('/').map(Bencode::str).collect()),
                ),
            ])
        })
        .collect();

    Bencode::dict(vec![
        ("announce", Bencode::str("https://fake.example/announce")),
        (
            "info",
            Bencode::dict(vec![
                ("name", Bencode::str(name)),
                ("piece length", Bencode::Int(piece_length as i64)),
                ("pieces", Bencode::Bytes(piece_hashes(&content, piece_length))),
                ("files", Bencode::List(entries)),
            ]),
        ),
    ])
    .encode()
}

pub(crate) fn single_file_torrent(name: &str, data: &[u8], piece_length: usize) -> Vec<u8> {
    Bencode::dict(vec![
        ("announce", Bencode::str("https://fake.example/announce")),
        (
            "info",
            Bencode::dict(vec![
                ("name", Bencode::str(name)),
                ("length", Bencode::Int(data.len() as i64)),
                ("piece length", Bencode::Int(piece_length as i64)),
                ("pieces", Bencode::Bytes(piece_hashes(data, piece_length))),
            ]),
        ),
    ])
    .encode()
}

// ============================================================================
// Remote
// ============================================================================

const S_IFREG: u32 = 0o100_000;
const FAKE_DIR_MODE: u32 = crate::constants::S_IFDIR | 0o755;

/// Chunk size used by [`FakeSession::get_whole_file`].
pub(crate) const FAKE_GET_CHUNK: usize = 100;

/// Shared, inspectable state of a [`FakeRemote`] and all its sessions.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// Reads served so far, whole-file chunks included.
    pub reads: u64,
    /// 1-based read numbers that fail with a timeout.
    pub fail_reads: BTreeSet<u64>,
    /// Bytes at the end of the local file garbled when a whole-file copy faults.
    pub torn_tail: usize,
    /// Remote directories whose listing fails.
    pub failing_dirs: BTreeSet<String>,
    /// Number of upcoming connects that time out.
    pub refuse_connects: u32,
    pub connects: u32,
    pub closes: u32,
    /// Every directory passed to `change_working_directory`.
    pub chdirs: Vec<String>,
    /// Cancels the token once the given read has been served.
    pub cancel_at: Option<(u64, CancelToken)>,
}

impl FakeState {
    fn next_read(&mut self) -> Result<(), RemoteError> {
        self.reads += 1;
        if self.fail_reads.remove(&self.reads) {
            return Err(RemoteError::Timeout);
        }
        if let Some((at, token)) = &self.cancel_at {
            if *at == self.reads {
                token.cancel();
            }
        }
        Ok(())
    }
}

/// A remote host whose file system is a local directory.
#[derive(Debug, Clone)]
pub(crate) struct FakeRemote {
    root: PathBuf,
    state: Arc<Mutex<FakeState>>,
}

impl FakeRemote {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock()
    }

    /// Writes a remote file, creating parent directories.
    pub(crate) fn put(&self, path: &str, data: &[u8]) -> PathBuf {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, data).unwrap();
        full
    }
}

impl Connector for FakeRemote {
    type Session = FakeSession;

    fn connect(&self, _params: &ConnectParams) -> Result<FakeSession, RemoteError> {
        let mut state = self.state.lock();
        state.connects += 1;
        if state.refuse_connects > 0 {
            state.refuse_connects -= 1;
            return Err(RemoteError::Timeout);
        }

        Ok(FakeSession {
            root: self.root.clone(),
            state: Arc::clone(&self.state),
            cwd: None,
        })
    }
}

pub(crate) fn fake_params() -> ConnectParams {
    ConnectParams::new("fake.example", "tester").with_password("secret")
}

pub(crate) struct FakeSession {
    root: PathBuf,
    state: Arc<Mutex<FakeState>>,
    cwd: Option<String>,
}

impl FakeSession {
    /// Absolute remote form of `path`.
    fn absolute(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            join_remote(self.cwd.as_deref().unwrap_or("/"), path)
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.absolute(path)
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .fold(self.root.clone(), |acc, s| acc.join(s))
    }
}

fn remote_err(path: &str, err: io::Error) -> RemoteError {
    if err.kind() == io::ErrorKind::NotFound {
        RemoteError::NotFound(path.to_string())
    } else {
        RemoteError::Io(err)
    }
}

fn epoch_secs(time: io::Result<std::time::SystemTime>) -> u64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

#[cfg(unix)]
fn file_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    S_IFREG | (meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(_meta: &fs::Metadata) -> u32 {
    S_IFREG | 0o644
}

impl RemoteSession for FakeSession {
    type Reader = FakeReader;

    fn list_directory(&mut self, path: &str) -> Result<Vec<FileAttributes>, RemoteError> {
        if self.state.lock().failing_dirs.contains(path) {
            return Err(RemoteError::Protocol(format!("permission denied: {path}")));
        }

        let mut entries = Vec::new();
        for dirent in fs::read_dir(self.resolve(path)).map_err(|e| remote_err(path, e))? {
            let dirent = dirent?;
            let meta = dirent.metadata()?;
            entries.push(FileAttributes {
                filename: dirent.file_name().to_string_lossy().into_owned(),
                size: if meta.is_dir() { 4096 } else { meta.len() },
                mode: if meta.is_dir() { FAKE_DIR_MODE } else { file_mode(&meta) },
                mtime: epoch_secs(meta.modified()),
                atime: epoch_secs(meta.accessed()),
            });
        }
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    fn open_for_ranged_read(&mut self, path: &str) -> Result<FakeReader, RemoteError> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(RemoteError::NotFound(path.to_string()));
        }
        Ok(FakeReader {
            path: full,
            state: Arc::clone(&self.state),
        })
    }

    fn get_whole_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
        progress: &mut dyn FnMut(u64) -> ControlFlow<()>,
    ) -> Result<u64, RemoteError> {
        let mut src =
            File::open(self.resolve(remote_path)).map_err(|e| remote_err(remote_path, e))?;
        let mut dst = File::create(local_path)?;
        let mut chunk = vec![0u8; FAKE_GET_CHUNK];
        let mut written = 0u64;

        loop {
            let fault = {
                let mut state = self.state.lock();
                state.next_read().err().map(|err| (err, state.torn_tail))
            };
            if let Some((err, torn)) = fault {
                garble_tail(&mut dst, written, torn)?;
                return Err(err);
            }

            let n = src.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            dst.write_all(&chunk[..n])?;
            written += n as u64;

            if progress(written).is_break() {
                return Err(RemoteError::Aborted);
            }
        }

        dst.sync_all()?;
        Ok(written)
    }

    fn change_working_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        self.state.lock().chdirs.push(path.to_string());
        if !self.resolve(path).is_dir() {
            return Err(RemoteError::NotFound(path.to_string()));
        }
        self.cwd = Some(self.absolute(path));
        Ok(())
    }

    fn working_directory(&mut self) -> Result<Option<String>, RemoteError> {
        Ok(self.cwd.clone())
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

/// Flips the last `torn` bytes written, as a partially flushed write would.
fn garble_tail(file: &mut File, written: u64, torn: usize) -> io::Result<()> {
    let torn = (torn as u64).min(written);
    if torn == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::Start(written - torn))?;
    file.write_all(&vec![0xA5; torn as usize])?;
    Ok(())
}

pub(crate) struct FakeReader {
    path: PathBuf,
    state: Arc<Mutex<FakeState>>,
}

impl RangedRead for FakeReader {
    fn read_at(&mut self, offset: u64, len: u32) -> Result<Bytes, RemoteError> {
        self.state.lock().next_read()?;

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(len as usize);
        file.take(u64::from(len)).read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

pub(crate) fn append(path: &Path, data: &[u8]) {
    OpenOptions::new()
        .append(true)
        .open(path)
        .unwrap()
        .write_all(data)
        .unwrap();
}
