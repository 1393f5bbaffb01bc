//! Command-line front end for the pmarray array registry.
//!
//! ```text
//! pmarray <file> print   <name>
//! pmarray <file> free    <name>
//! pmarray <file> alloc   <name> <size>
//! pmarray <file> realloc <name> <size>
//! ```
//!
//! The pool file is created on first use. Results and notices go to
//! stdout, usage lines to stderr. Rejected requests (duplicate name, bad
//! size, missing array, wrong argument count) exit 0 without touching the
//! pool; only too few arguments or a pool failure exit 1.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod op;

use std::borrow::Cow;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use pmarray_pool::{FileStore, Pool, PoolConfig, PoolStore};
use pmarray_registry::{ArrayRegistry, RegistryError};
use tracing::debug;

pub use op::{generic_usage, parse_size, ArrayOp};

/// Layout name stamped into pools created by this tool.
pub const LAYOUT: &str = "pmarray-array";

/// Environment variable overriding the capacity of newly created pools.
pub const POOL_SIZE_ENV: &str = "PMARRAY_POOL_SIZE";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PMARRAY_LOG";

/// Build the config for a new pool, taking the capacity from `pool_size`
/// if set.
pub fn pool_config(pool_size: Option<&str>) -> anyhow::Result<PoolConfig> {
    let capacity = match pool_size {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid {POOL_SIZE_ENV} value {raw:?}"))?,
        None => PoolConfig::DEFAULT_CAPACITY,
    };
    let config = PoolConfig::new(capacity).with_layout(LAYOUT);
    config
        .validate()
        .with_context(|| format!("invalid {POOL_SIZE_ENV} value {capacity}"))?;
    Ok(config)
}

/// Run one invocation and return the process exit code.
///
/// `args` includes the program name and is taken as given by the OS, so a
/// pool path that is not UTF-8 is used verbatim. `pool_size` is only read
/// when the pool file does not exist yet. Pool failures come back as `Err`.
pub fn run(
    args: &[OsString],
    pool_size: Option<&str>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<i32> {
    let prog = args
        .first()
        .map_or(Cow::Borrowed("pmarray"), |arg| arg.to_string_lossy());
    if args.len() < 4 {
        writeln!(err, "{}", generic_usage(&prog))?;
        return Ok(1);
    }
    let mut registry = open_registry(Path::new(&args[1]), pool_size)?;

    let Some(op) = args[2].to_str().and_then(ArrayOp::parse) else {
        debug!(keyword = ?args[2], "unknown operation");
        writeln!(out, "Ruh roh! You passed an invalid operation!")?;
        writeln!(err, "{}", generic_usage(&prog))?;
        return Ok(0);
    };
    if args.len() != op.argc() {
        writeln!(err, "{}", op.usage(&prog))?;
        return Ok(0);
    }
    let Some(name) = args[3].to_str() else {
        debug!(array = ?args[3], "array name is not valid UTF-8");
        writeln!(err, "{}", op.usage(&prog))?;
        return Ok(0);
    };
    let size = || args.get(4).and_then(|arg| arg.to_str()).map_or(0, parse_size);

    match op {
        ArrayOp::Print => match registry.render(name)? {
            Some(line) => writeln!(out, "{line}")?,
            None => writeln!(out, "No array found with name: {name}")?,
        },
        ArrayOp::Free => match registry.delete(name) {
            Ok(()) => {}
            Err(RegistryError::NotFound { .. }) => {
                writeln!(out, "No array found with name: {name}")?
            }
            Err(e) => return Err(e.into()),
        },
        ArrayOp::Alloc => match registry.allocate(name, size()) {
            Ok(()) => writeln!(out, "Creating new array entry with name:{name}")?,
            Err(RegistryError::DuplicateName { .. }) => {
                writeln!(
                    out,
                    "Array with name: {name} already exists. If you prefer, you can reallocate this array"
                )?;
                writeln!(err, "{}", ArrayOp::Realloc.usage(&prog))?;
            }
            Err(RegistryError::InvalidSize { .. }) => {
                writeln!(out, "size must be a non-negative integer")?;
                writeln!(err, "{}", ArrayOp::Alloc.usage(&prog))?;
            }
            Err(e) => return Err(e.into()),
        },
        ArrayOp::Realloc => match registry.resize(name, size()) {
            Ok(()) => {}
            Err(RegistryError::NotFound { .. }) => {
                writeln!(out, "No array found with name: {name}")?
            }
            Err(RegistryError::InvalidSize { .. }) => {
                writeln!(out, "size must be a non-negative integer")?;
                writeln!(err, "{}", ArrayOp::Realloc.usage(&prog))?;
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(0)
}

/// Open the pool at `file`, creating it if absent, and initialize the
/// registry in it.
fn open_registry(file: &Path, pool_size: Option<&str>) -> anyhow::Result<ArrayRegistry> {
    let store = FileStore::new(file);
    let pool = if store.exists() {
        Pool::open(store, LAYOUT)
    } else {
        Pool::create(store, pool_config(pool_size)?)
    }
    .with_context(|| format!("failed to open pool {}", file.display()))?;
    ArrayRegistry::open(pool)
        .with_context(|| format!("failed to initialize registry in {}", file.display()))
}
