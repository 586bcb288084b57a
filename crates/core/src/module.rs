//! Extension module location
//!
//! Turns a user-supplied script path into the pieces a loader needs: the
//! module identifier and the directory to put on the search path.
//!
//! # Examples
//!
//! ```
//! use kiln_core::module::module_name;
//! use std::path::Path;
//!
//! assert_eq!(module_name(Path::new("scripts/gen_assets.py")).as_deref(), Some("gen_assets"));
//! assert_eq!(module_name(Path::new("notes.txt")), None);
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Source suffixes whose module identifier is the plain file stem
const SOURCE_SUFFIXES: &[&str] = &["py", "pyc", "pyw"];

/// Native extension suffixes; the identifier stops at the first `.`
/// (`fast.cpython-312-x86_64-linux-gnu.so` is module `fast`)
const NATIVE_SUFFIXES: &[&str] = &["so", "pyd"];

/// Derive the module identifier for a script path
///
/// Returns `None` when the file name does not carry a module suffix, in which
/// case nothing could import it.
pub fn module_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let extension = path.extension()?.to_str()?;

    let name = if SOURCE_SUFFIXES.contains(&extension) {
        path.file_stem()?.to_str()?
    } else if NATIVE_SUFFIXES.contains(&extension) {
        file_name.split('.').next()?
    } else {
        return None;
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// A script located on disk and ready to be loaded for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionModule {
    path: PathBuf,
    name: String,
    search_dir: PathBuf,
}

impl ExtensionModule {
    /// Locate the module behind a script path
    ///
    /// Relative paths are taken from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleNotFound`] naming `path` as given when the file
    /// does not exist or has no module suffix.
    pub fn locate(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path).map_err(|_| Error::module_not_found(path))?;

        if !absolute.is_file() {
            return Err(Error::module_not_found(path));
        }

        let name = module_name(&absolute).ok_or_else(|| Error::module_not_found(path))?;
        let search_dir = absolute
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::module_not_found(path))?;

        Ok(Self {
            path: absolute,
            name,
            search_dir,
        })
    }

    /// Absolute path of the script
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Module identifier (file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the loader must search to find this module
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }
}
