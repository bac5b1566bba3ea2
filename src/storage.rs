use crate::models::Routine;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

/// Handle to the single JSON document holding every routine.
#[derive(Debug, Clone)]
pub struct RoutineStorage {
    path: PathBuf,
}

impl RoutineStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. Any failure yields an empty collection.
    pub async fn load(&self) -> Vec<Routine> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<Routine>>(&bytes) {
                Ok(routines) if has_duplicate_ids(&routines) => {
                    error!("routines file repeats an id; ignoring it");
                    Vec::new()
                }
                Ok(routines) => {
                    info!(count = routines.len(), path = %self.path.display(), "loaded routines");
                    routines
                }
                Err(err) => {
                    error!("failed to parse routines file: {err}");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                error!("failed to read routines file: {err}");
                Vec::new()
            }
        }
    }

    /// Writes the whole collection next to the target, then renames it over.
    pub async fn save(&self, routines: &[Routine]) -> io::Result<()> {
        let payload = serde_json::to_vec_pretty(routines)?;
        atomic_write(&self.path, &payload).await?;
        debug!(count = routines.len(), "saved routines");
        Ok(())
    }
}

fn has_duplicate_ids(routines: &[Routine]) -> bool {
    let mut seen = HashSet::with_capacity(routines.len());
    !routines.iter().all(|routine| seen.insert(routine.id))
}

async fn atomic_write(path: &Path, payload: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    let written = async {
        fs::write(&tmp_path, payload).await?;
        fs::File::open(&tmp_path).await?.sync_all().await?;
        fs::rename(&tmp_path, path).await
    }
    .await;

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    written
}
