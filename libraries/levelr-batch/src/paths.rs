//! Guards the files a batch writes against the files it reads

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Comparable form of a path
///
/// Existing paths are canonicalized; for a path that does not exist yet the
/// parent is canonicalized and the file name appended. Keys ignore case so
/// the checks also hold on case-insensitive file systems.
fn path_key(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| {
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => parent
                .canonicalize()
                .map(|parent| parent.join(name))
                .unwrap_or_else(|_| path.to_path_buf()),
            _ => path.to_path_buf(),
        }
    });
    resolved.to_string_lossy().to_lowercase()
}

/// Output paths handed out during one run
///
/// Built from every input the run will read. A file the run writes may not
/// be one of those inputs, and two inputs may not write the same output.
#[derive(Debug)]
pub(crate) struct OutputClaims {
    sources: HashMap<String, PathBuf>,
    claimed: HashMap<String, PathBuf>,
}

impl OutputClaims {
    pub(crate) fn new<'a>(inputs: impl IntoIterator<Item = &'a PathBuf>) -> Self {
        let sources = inputs
            .into_iter()
            .map(|input| (path_key(input), input.clone()))
            .collect();
        Self {
            sources,
            claimed: HashMap::new(),
        }
    }

    /// Reserve `output` (and the working file `temp`, if any) for `input`
    ///
    /// The error is the failure reason to report for `input`.
    pub(crate) fn claim(
        &mut self,
        input: &Path,
        output: &Path,
        temp: Option<&Path>,
    ) -> Result<(), String> {
        for written in std::iter::once(output).chain(temp) {
            if let Some(source) = self.sources.get(&path_key(written)) {
                return Err(format!(
                    "{} would overwrite source {}",
                    written.display(),
                    source.display()
                ));
            }
        }

        let key = path_key(output);
        if let Some(first) = self.claimed.get(&key) {
            return Err(format!("output name collides with {}", first.display()));
        }
        self.claimed.insert(key, input.to_path_buf());
        Ok(())
    }
}
