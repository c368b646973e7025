//! Writing rendered plans to disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pipeline::Timestamp;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Numbered alternatives tried when the timestamped name is taken.
const MAX_SUFFIX: u32 = 99;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create output directory '{}': {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no free file name left for '{}'", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The file name a document persisted at `at` receives:
/// `<stem>_<YYYYMMDD_HHMMSS>.txt`, or `<stem>_<YYYYMMDD_HHMMSS>_<n>.txt` for
/// the `n`-th document written in the same second.
pub fn file_name(file_stem: &str, at: Timestamp, attempt: u32) -> String {
    match attempt {
        0 | 1 => format!("{file_stem}_{}.txt", at.display_compact()),
        n => format!("{file_stem}_{}_{n}.txt", at.display_compact()),
    }
}

/// Writes `document` to a new file in `dir`, creating `dir` if needed.
///
/// An existing file is never overwritten; a numbered name is used instead.
pub async fn persist(
    document: &str,
    dir: &Path,
    file_stem: &str,
    at: Timestamp,
) -> Result<PathBuf, PersistenceError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| PersistenceError::CreateDir {
            dir: dir.to_path_buf(),
            source,
        })?;

    let (path, mut file) = create_unique(dir, file_stem, at).await?;

    let write = async {
        file.write_all(document.as_bytes()).await?;
        file.flush().await
    };
    if let Err(source) = write.await {
        return Err(PersistenceError::Write { path, source });
    }

    info!(path = %path.display(), bytes = document.len(), "plan document written");
    Ok(path)
}

async fn create_unique(
    dir: &Path,
    file_stem: &str,
    at: Timestamp,
) -> Result<(PathBuf, File), PersistenceError> {
    let mut attempt = 1;
    loop {
        let path = dir.join(file_name(file_stem, at, attempt));
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        match opened {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_SUFFIX => {
                debug!(path = %path.display(), "output file exists, trying the next name");
                attempt += 1;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PersistenceError::AlreadyExists { path });
            }
            Err(source) => return Err(PersistenceError::Write { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn at() -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 5).unwrap())
    }

    #[test]
    fn file_name_is_stem_and_compact_timestamp() {
        assert_eq!(
            file_name("travel_plan_iceland", at(), 1),
            "travel_plan_iceland_20260115_093005.txt"
        );
        assert_eq!(
            file_name("travel_plan_iceland", at(), 3),
            "travel_plan_iceland_20260115_093005_3.txt"
        );
    }

    #[tokio::test]
    async fn writes_document_into_new_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("plans");

        let path = persist("PLAN\nbody\n", &dir, "conference_plan", at())
            .await
            .unwrap();

        assert_eq!(path, dir.join("conference_plan_20260115_093005.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "PLAN\nbody\n");
    }

    #[tokio::test]
    async fn same_second_runs_get_numbered_files() {
        let temp = tempfile::tempdir().unwrap();
        let first = persist("first", temp.path(), "conference_plan", at())
            .await
            .unwrap();

        let second = persist("second", temp.path(), "conference_plan", at())
            .await
            .unwrap();
        let third = persist("third", temp.path(), "conference_plan", at())
            .await
            .unwrap();

        assert_eq!(
            second,
            temp.path().join("conference_plan_20260115_093005_2.txt")
        );
        assert_eq!(
            third,
            temp.path().join("conference_plan_20260115_093005_3.txt")
        );
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");
    }

    #[tokio::test]
    async fn gives_up_when_every_name_is_taken() {
        let temp = tempfile::tempdir().unwrap();
        for attempt in 1..=MAX_SUFFIX {
            let name = file_name("conference_plan", at(), attempt);
            std::fs::write(temp.path().join(name), "taken").unwrap();
        }

        let err = persist("late", temp.path(), "conference_plan", at())
            .await
            .unwrap_err();

        assert!(matches!(err, PersistenceError::AlreadyExists { .. }));
        let last = temp
            .path()
            .join(file_name("conference_plan", at(), MAX_SUFFIX));
        assert_eq!(std::fs::read_to_string(last).unwrap(), "taken");
    }
}
