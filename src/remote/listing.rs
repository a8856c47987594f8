use std::vec;

use tracing::warn;

use super::entry::{FileAttributes, RemoteEntry};
use super::error::RemoteError;
use super::session::RemoteSession;

/// Lazy depth-first listing of a remote directory tree.
///
/// Only non-directory entries are produced; directories are descended into
/// as they are met. The listing does not hold the session, so the caller can
/// reconnect between steps and keep listing on the new session.
///
/// A failure to list the start directory is always returned. A failure to
/// list a subdirectory ends the listing when `strict` is set and is logged
/// and skipped otherwise.
#[derive(Debug)]
pub struct RecursiveListing {
    start: Option<String>,
    stack: Vec<(String, vec::IntoIter<FileAttributes>)>,
    strict: bool,
}

impl RecursiveListing {
    pub fn new(start: impl Into<String>, strict: bool) -> Self {
        Self {
            start: Some(start.into()),
            stack: Vec::new(),
            strict,
        }
    }

    /// Produces the next file entry, listing directories through `session`
    /// as needed. Returns `None` once the tree is exhausted or after an error.
    pub fn next_entry<S: RemoteSession>(
        &mut self,
        session: &mut S,
    ) -> Option<Result<RemoteEntry, RemoteError>> {
        if let Some(start) = self.start.take() {
            match session.list_directory(&start) {
                Ok(children) => self.stack.push((start, children.into_iter())),
                Err(err) => return Some(Err(err)),
            }
        }

        loop {
            let (dir, children) = self.stack.last_mut()?;
            let Some(attrs) = children.next() else {
                self.stack.pop();
                continue;
            };

            let entry = RemoteEntry::from_attributes(dir, attrs);
            if !entry.is_directory {
                return Some(Ok(entry));
            }

            match session.list_directory(&entry.path) {
                Ok(children) => self.stack.push((entry.path, children.into_iter())),
                Err(err) if self.strict => {
                    self.stack.clear();
                    return Some(Err(err));
                }
                Err(err) => warn!(path = %entry.path, %err, "skipping unreadable directory"),
            }
        }
    }

    /// Binds the listing to `session` as an [`Iterator`].
    pub fn entries<S: RemoteSession>(self, session: &mut S) -> Entries<'_, S> {
        Entries {
            listing: self,
            session,
        }
    }
}

/// Iterator over a [`RecursiveListing`] borrowing one session.
pub struct Entries<'s, S> {
    listing: RecursiveListing,
    session: &'s mut S,
}

impl<S: RemoteSession> Iterator for Entries<'_, S> {
    type Item = Result<RemoteEntry, RemoteError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.listing.next_entry(&mut *self.session)
    }
}

/// Lists every file below `start`, depth first.
///
/// ```no_run
/// # use seedsync::remote::{list_recursive, RemoteSession};
/// # fn run<S: RemoteSession>(session: &mut S) -> Result<(), seedsync::remote::RemoteError> {
/// for entry in list_recursive(session, "complete", false) {
///     let entry = entry?;
///     println!("{} ({} bytes)", entry.path, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_recursive<'s, S: RemoteSession>(
    session: &'s mut S,
    start: &str,
    strict: bool,
) -> Entries<'s, S> {
    RecursiveListing::new(start, strict).entries(session)
}
