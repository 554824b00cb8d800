//! Run directories and the archive artifacts written into them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;

use crate::archive::{Archive, Elite};
use crate::error::{MapElitesError, Result};

pub const PERFORMANCES_FILE: &str = "performances.json";
pub const SOLUTIONS_FILE: &str = "solutions.json";
pub const CONFIG_FILE: &str = "mapelites.toml";
pub const LOG_FILE: &str = "log.log";
pub const HEATMAP_FILE: &str = "heatmap.svg";

/// A timestamped directory holding the results of one run.
#[derive(Clone, Debug)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    /// Create `log_<YYYYmmddHHMMSS>` under `parent`, adding a numeric suffix
    /// when that name is taken.
    pub fn create(parent: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        fs::create_dir_all(parent).map_err(|err| MapElitesError::io(parent, err))?;

        let stem = format!("log_{}", Local::now().format("%Y%m%d%H%M%S"));
        let mut suffix = 0;
        loop {
            let name = match suffix {
                0 => stem.clone(),
                n => format!("{stem}-{n}"),
            };
            let path = parent.join(name);

            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { path }),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(err) => return Err(MapElitesError::io(path, err)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, file: &str) -> PathBuf {
        self.path.join(file)
    }

    /// Write the performance and genotype grids of `archive`.
    pub fn save_archive(&self, archive: &Archive) -> Result<()> {
        let performances = performance_grid(archive);
        let solutions = solution_grid(archive);

        self.write_json(PERFORMANCES_FILE, &performances)?;
        self.write_json(SOLUTIONS_FILE, &solutions)?;
        Ok(())
    }

    pub fn write_text(&self, file: &str, content: &str) -> Result<PathBuf> {
        let path = self.join(file);
        fs::write(&path, content).map_err(|err| MapElitesError::io(&path, err))?;
        Ok(path)
    }

    /// Copy an external file, such as the configuration the run was started
    /// from, into the run directory.
    pub fn copy_in(&self, source: impl AsRef<Path>, file: &str) -> Result<PathBuf> {
        let source = source.as_ref();
        let path = self.join(file);
        fs::copy(source, &path).map_err(|err| MapElitesError::io(source, err))?;
        Ok(path)
    }

    fn write_json(&self, file: &str, value: &Value) -> Result<PathBuf> {
        let content = serde_json::to_string(value)?;
        self.write_text(file, &content)
    }
}

/// Performances nested in the archive's shape, `null` for empty cells.
pub fn performance_grid(archive: &Archive) -> Value {
    nest(archive.grid().shape(), archive.grid().cells(), &|cell: &Option<Elite>| {
        cell.as_ref()
            .and_then(|elite| serde_json::Number::from_f64(elite.performance))
            .map_or(Value::Null, Value::Number)
    })
}

/// Genomes nested in the archive's shape, `null` for empty cells.
pub fn solution_grid(archive: &Archive) -> Value {
    nest(archive.grid().shape(), archive.grid().cells(), &|cell: &Option<Elite>| match cell {
        Some(elite) => Value::Array(
            elite
                .genome
                .iter()
                .map(|&gene| serde_json::Number::from_f64(gene).map_or(Value::Null, Value::Number))
                .collect(),
        ),
        None => Value::Null,
    })
}

fn nest<T>(shape: &[usize], cells: &[T], leaf: &dyn Fn(&T) -> Value) -> Value {
    match shape {
        [] => cells.first().map_or(Value::Null, leaf),
        [_] => Value::Array(cells.iter().map(leaf).collect()),
        [_, inner @ ..] => {
            let stride: usize = inner.iter().product();
            Value::Array(cells.chunks(stride).map(|chunk| nest(inner, chunk, leaf)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Objective;
    use serde_json::json;

    #[test]
    fn grids_follow_archive_shape() {
        let mut archive = Archive::new(vec![2, 3], Objective::Minimize).unwrap();
        archive.place(&[0, 1], vec![0.5, 1.5], 4.0).unwrap();
        archive.place(&[1, 2], vec![-1.0], 2.5).unwrap();

        assert_eq!(
            performance_grid(&archive),
            json!([[null, 4.0, null], [null, null, 2.5]])
        );
        assert_eq!(
            solution_grid(&archive),
            json!([[null, [0.5, 1.5], null], [null, null, [-1.0]]])
        );
    }

    #[test]
    fn run_directories_do_not_collide() {
        let parent = tempfile::tempdir().unwrap();

        let first = RunDirectory::create(parent.path()).unwrap();
        let second = RunDirectory::create(parent.path()).unwrap();

        assert_ne!(first.path(), second.path());
        assert!(first.path().is_dir());
        assert!(second.path().is_dir());
        assert!(first
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("log_"));
    }

    #[test]
    fn save_archive_writes_both_grids() {
        let parent = tempfile::tempdir().unwrap();
        let run = RunDirectory::create(parent.path()).unwrap();

        let mut archive = Archive::new(vec![3], Objective::Maximize).unwrap();
        archive.place(&[2], vec![1.0, 2.0], 9.0).unwrap();
        run.save_archive(&archive).unwrap();

        let performances: Value =
            serde_json::from_str(&fs::read_to_string(run.join(PERFORMANCES_FILE)).unwrap()).unwrap();
        let solutions: Value =
            serde_json::from_str(&fs::read_to_string(run.join(SOLUTIONS_FILE)).unwrap()).unwrap();

        assert_eq!(performances, json!([null, null, 9.0]));
        assert_eq!(solutions, json!([null, null, [1.0, 2.0]]));
    }
}
