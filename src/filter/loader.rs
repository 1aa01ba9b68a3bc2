//! Filter Loader
//!
//! Wraps libloading for opening compiled filter libraries.

use std::collections::HashMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use tracing::{debug, warn};

use super::{FilterError, FilterResult};
use crate::buffer::Buffer;
use crate::config::RuntimeConfig;
use crate::runtime::halide_buffer_t;

/// Signature of a pipeline entry point with one input and one output
type PipelineFn = unsafe extern "C" fn(*const halide_buffer_t, *mut halide_buffer_t) -> i32;

/// A pipeline entry point resolved from a loaded library
pub struct Filter {
    path: PathBuf,
    symbol: String,
    entry: PipelineFn,
    // Keeps `entry` mapped; must outlive it.
    _library: Library,
}

impl Filter {
    /// Open the library at `path` and resolve `symbol`
    pub fn load(path: impl AsRef<Path>, symbol: &str) -> FilterResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Safety: opening a library runs its initializers. We trust the
        // caller to hand us a compiled filter.
        let library = unsafe {
            Library::new(&path).map_err(|e| {
                FilterError::LoadError(format!(
                    "Failed to load library '{}': {}",
                    path.display(),
                    e
                ))
            })?
        };
        debug!(path = %path.display(), "loaded filter library");

        let c_name = CString::new(symbol)
            .map_err(|_| FilterError::InvalidSymbol(format!("Invalid symbol name: {}", symbol)))?;

        // Safety: the symbol is assumed to have the pipeline signature; a
        // mismatch is undefined behaviour at call time.
        let entry: PipelineFn = unsafe {
            let sym: Symbol<PipelineFn> =
                library.get(c_name.as_bytes_with_nul()).map_err(|e| {
                    FilterError::SymbolNotFound(format!(
                        "Symbol '{}' not found in '{}': {}",
                        symbol,
                        path.display(),
                        e
                    ))
                })?;
            *sym
        };
        debug!(symbol, "resolved filter entry point");

        Ok(Self {
            path,
            symbol: symbol.to_string(),
            entry,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Run the pipeline, reading `input` and writing `output`
    ///
    /// The descriptors must describe data of the shape and type the pipeline
    /// was compiled for; this is not checked here.
    pub fn run(&self, input: &Buffer<'_>, output: &mut Buffer<'_>) -> FilterResult<()> {
        // Safety: both descriptors are well-formed and their dimension arrays
        // live as long as the borrows.
        let status = unsafe { (self.entry)(input.as_raw(), output.as_mut_raw()) };
        if status != 0 {
            warn!(symbol = %self.symbol, status, "filter returned an error");
            return Err(FilterError::Pipeline(status));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("path", &self.path)
            .field("symbol", &self.symbol)
            .finish()
    }
}

/// Filter loader with library search paths
pub struct FilterLoader {
    /// Search paths for libraries
    search_paths: Vec<PathBuf>,
    /// Named filters from configuration: name -> (library, symbol)
    entries: HashMap<String, (String, String)>,
    /// Loaded filters, keyed by resolved library path and symbol
    filters: HashMap<(PathBuf, String), Arc<Filter>>,
    /// Configured filters that have been loaded, keyed by entry name
    named: HashMap<String, Arc<Filter>>,
}

impl FilterLoader {
    /// Create a loader with the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: default_search_paths(),
            entries: HashMap::new(),
            filters: HashMap::new(),
            named: HashMap::new(),
        }
    }

    /// Create a loader from configuration. Configured search paths are
    /// searched before the defaults.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut search_paths = config.filters.search_paths.clone();
        search_paths.extend(default_search_paths());

        let entries = config
            .filters
            .entries
            .iter()
            .map(|(name, entry)| {
                let symbol = entry.symbol.clone().unwrap_or_else(|| name.clone());
                (name.clone(), (entry.library.clone(), symbol))
            })
            .collect();

        #[cfg(feature = "gpu")]
        config.gpu.apply();

        Self {
            search_paths,
            entries,
            filters: HashMap::new(),
            named: HashMap::new(),
        }
    }

    /// Add a search path
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        self.search_paths.push(path.as_ref().to_path_buf());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find a library by path or name
    pub fn find_library(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.exists() {
            return Some(path.to_path_buf());
        }

        let lib_name = library_filename(name);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&lib_name))
            .find(|candidate| candidate.exists())
    }

    /// Load `symbol` from `library`. Repeated loads of the same symbol from
    /// the same file return the cached filter.
    pub fn load(&mut self, library: &str, symbol: &str) -> FilterResult<Arc<Filter>> {
        let path = self
            .find_library(library)
            .ok_or_else(|| FilterError::NotFound(format!("Library '{}' not found", library)))?;
        let path = std::fs::canonicalize(&path).unwrap_or(path);

        let key = (path, symbol.to_string());
        if let Some(filter) = self.filters.get(&key) {
            return Ok(Arc::clone(filter));
        }

        let filter = Arc::new(Filter::load(&key.0, symbol)?);
        self.filters.insert(key, Arc::clone(&filter));
        Ok(filter)
    }

    /// Load a filter declared in configuration
    pub fn load_named(&mut self, name: &str) -> FilterResult<Arc<Filter>> {
        if let Some(filter) = self.named.get(name) {
            return Ok(Arc::clone(filter));
        }

        let (library, symbol) = self
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| FilterError::NotFound(format!("No filter named '{}'", name)))?;

        let filter = self.load(&library, &symbol)?;
        self.named.insert(name.to_string(), Arc::clone(&filter));
        Ok(filter)
    }

    /// Get a loaded configured filter by entry name
    pub fn get(&self, name: &str) -> Option<Arc<Filter>> {
        self.named.get(name).cloned()
    }

    /// Drop a configured filter and its cache entry. The library stays
    /// mapped until every `Arc` is gone.
    pub fn unload(&mut self, name: &str) -> bool {
        let Some(filter) = self.named.remove(name) else {
            return false;
        };
        self.filters
            .retain(|_, cached| !Arc::ptr_eq(cached, &filter));
        true
    }

    /// Names of the configured filters loaded so far
    pub fn loaded_filters(&self) -> Vec<&str> {
        self.named.keys().map(|s| s.as_str()).collect()
    }

    /// Number of distinct (library, symbol) pairs held
    pub fn cached(&self) -> usize {
        self.filters.len()
    }
}

impl Default for FilterLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Current directory, then the dynamic loader's path variable. System
/// library directories are not listed.
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    let var = if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else if cfg!(windows) {
        "PATH"
    } else {
        "LD_LIBRARY_PATH"
    };
    if let Some(value) = std::env::var_os(var) {
        paths.extend(std::env::split_paths(&value));
    }

    paths
}

/// Construct the platform-specific library filename
pub fn library_filename(name: &str) -> String {
    let (prefix, suffix) = (std::env::consts::DLL_PREFIX, std::env::consts::DLL_SUFFIX);
    if name.ends_with(suffix) {
        name.to_string()
    } else if name.starts_with(prefix) {
        format!("{}{}", name, suffix)
    } else {
        format!("{}{}{}", prefix, name, suffix)
    }
}
