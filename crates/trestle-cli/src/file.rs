//! File-pair adapter: one input file to one output file.
//!
//! A regular output file is replaced atomically: the SVG goes to a temporary
//! file next to the resolved target and is renamed over it once complete, so
//! the target either keeps its old content or holds the whole new SVG.
//! Symlinks are followed to their target. Outputs that are not regular files,
//! such as `/dev/null` or a FIFO, are written in place.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use tempfile::{Builder, NamedTempFile};

use crate::{CliError, Phase, Renderer, decode, render};

/// Convert the diagram at `input` into SVG at `output`.
///
/// A missing output file is created and an existing one is replaced.
/// Nothing touches `output` unless reading and rendering succeed.
///
/// # Errors
///
/// Returns [`CliError::Acquire`] if `input` cannot be read,
/// [`CliError::Render`] if the renderer rejects the source and
/// [`CliError::Emit`] if `output` cannot be written.
pub fn run_file_pair<R>(renderer: &R, input: &Path, output: &Path) -> Result<(), CliError>
where
    R: Renderer + ?Sized,
{
    let source = acquire(input)?;
    let svg = render(renderer, source)?;
    emit(output, &svg)?;

    info!(output_file:? = output; "SVG exported successfully");
    Ok(())
}

fn acquire(path: &Path) -> Result<String, CliError> {
    Phase::Acquiring.enter();

    let bytes = fs::read(path).map_err(|err| CliError::acquire(path.display().to_string(), err))?;
    debug!(path:? = path, bytes = bytes.len(); "Input acquired");

    Ok(decode(bytes))
}

/// How the output path will be written.
enum Target {
    /// No file yet: created through a temporary file in `dir`.
    New { dir: PathBuf },
    /// An existing regular file, resolved through symlinks and already
    /// opened for writing.
    Regular { path: PathBuf, file: File },
    /// A device, FIFO or dangling symlink: written in place.
    Special,
}

fn emit(path: &Path, svg: &str) -> Result<(), CliError> {
    Phase::Emitting.enter();

    let emit_error = |err| CliError::emit(path.display().to_string(), err);

    match classify(path).map_err(emit_error)? {
        Target::New { dir } => {
            let file = new_temp_file(&dir, svg).map_err(emit_error)?;
            file.persist(path).map_err(|err| emit_error(err.error))?;
            debug!(path:? = path, bytes = svg.len(); "Output created");
        }
        Target::Regular {
            path: resolved,
            file: existing,
        } => replace_regular(&resolved, existing, svg).map_err(emit_error)?,
        Target::Special => {
            let mut file = File::create(path).map_err(emit_error)?;
            file.write_all(svg.as_bytes())
                .and_then(|()| file.flush())
                .map_err(emit_error)?;
            debug!(path:? = path, bytes = svg.len(); "Output written in place");
        }
    }

    Ok(())
}

fn classify(path: &Path) -> io::Result<Target> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {
            let resolved = fs::canonicalize(path)?;
            // Fails for outputs the user may not write, even when the
            // directory would allow a rename over them.
            let file = OpenOptions::new().write(true).open(&resolved)?;
            Ok(Target::Regular {
                path: resolved,
                file,
            })
        }
        Ok(_) => Ok(Target::Special),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if fs::symlink_metadata(path).is_ok() {
                return Ok(Target::Special);
            }
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            Ok(Target::New { dir })
        }
        Err(err) => Err(err),
    }
}

/// A synced temporary file in `dir` holding `svg`.
///
/// On Unix it is opened with mode `0o666`, so the process umask decides the
/// final permissions exactly as for a plain `File::create`.
fn new_temp_file(dir: &Path, svg: &str) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".trestle-");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut file = builder.tempfile_in(dir)?;
    file.write_all(svg.as_bytes())?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// Replace an existing regular file, keeping its permissions.
///
/// Falls back to truncating and rewriting `existing` when no temporary file
/// can be created next to it, as in a read-only directory.
fn replace_regular(path: &Path, mut existing: File, svg: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));

    match new_temp_file(dir, svg) {
        Ok(file) => {
            let permissions = existing.metadata()?.permissions();
            file.as_file().set_permissions(permissions)?;
            drop(existing);
            file.persist(path).map_err(|err| err.error)?;
            debug!(path:? = path, bytes = svg.len(); "Output replaced");
        }
        Err(err) => {
            warn!(path:? = path, error:% = err; "Cannot stage output next to target, overwriting in place");
            existing.set_len(0)?;
            existing.write_all(svg.as_bytes())?;
            existing.sync_all()?;
        }
    }

    Ok(())
}
