//! Config & CLI (`SPEC_FULL.md` §4.11): parses process arguments into a
//! validated, immutable `Config`, handling the `--dir` resolution quirks
//! the original tool carries.

use std::path::{Path, PathBuf};

use clap::Parser;

/// A local directory exposed as a single S3-compatible bucket.
#[derive(Debug, Parser)]
#[command(name = "lobos", about = "Expose a local directory as a single S3-compatible bucket")]
pub struct Cli {
    /// Directory for lobos to transform into an S3 bucket.
    #[arg(short, long)]
    pub dir: Option<String>,

    /// Port the HTTP server should listen on.
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Number of reactor threads to use. Too many will hurt perf.
    #[arg(short, long, default_value_t = 8)]
    pub threads: usize,

    /// Pin thread 0 to CPU#0, thread 1 to CPU#1, etc.
    #[arg(short = 'c', long = "pin-threads-to-cpus")]
    pub pin_threads_to_cpus: bool,

    /// Enable the in-memory lobos index.
    #[arg(short = 'e', long = "enable-lobos-index")]
    pub enable_lobos_index: bool,

    /// Refresh interval in seconds. Accepted, currently unused.
    #[arg(short = 'r', long = "lobos-index-refresh-sec", default_value_t = 0)]
    pub lobos_index_refresh_sec: u64,
}

/// The resolved, validated configuration the rest of the server runs from.
#[derive(Debug, Clone)]
pub struct Config {
    pub dir: PathBuf,
    pub bucket_name: String,
    pub port: u16,
    pub threads: usize,
    pub pin_threads: bool,
    pub index_enabled: bool,
    pub index_refresh_sec: u64,
}

/// A startup configuration failure, carrying the exit code the process
/// should use (`spec.md` §6 CLI's exit-code table).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    pub message: String,
    pub exit_code: i32,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let Some(dir_arg) = cli.dir else {
            return Err(ConfigError { message: "must specify --dir/-d".into(), exit_code: libc::EINVAL });
        };

        let dir = resolve_dir(&dir_arg)?;
        let bucket_name = bucket_name_for(&dir);

        Ok(Self {
            dir,
            bucket_name,
            port: cli.port,
            threads: cli.threads,
            pin_threads: cli.pin_threads_to_cpus,
            index_enabled: cli.enable_lobos_index,
            index_refresh_sec: cli.lobos_index_refresh_sec,
        })
    }
}

/// Resolve `--dir`'s value to an absolute path, applying the preserved `.`
/// quirk (a bare `.` becomes the *parent* of the current directory, not the
/// current directory itself) and a trailing `/` where meaningful for
/// display purposes.
fn resolve_dir(dir_arg: &str) -> Result<PathBuf, ConfigError> {
    let path = Path::new(dir_arg);
    if !path.is_dir() {
        return Err(ConfigError {
            message: format!("{dir_arg} is not a directory."),
            exit_code: libc::EINVAL,
        });
    }

    let absolute = std::fs::canonicalize(path).map_err(|e| ConfigError {
        message: format!("{dir_arg}: {e}"),
        exit_code: e.raw_os_error().unwrap_or(libc::EINVAL),
    })?;

    if dir_arg == "." {
        Ok(absolute.parent().map_or(absolute.clone(), Path::to_path_buf))
    } else {
        Ok(absolute)
    }
}

/// Bucket name = last non-empty path component of the resolved directory.
fn bucket_name_for(dir: &Path) -> String {
    dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "lobos".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_name_is_last_path_component() {
        assert_eq!(bucket_name_for(Path::new("/tmp/my-bucket")), "my-bucket");
    }

    #[test]
    fn dot_quirk_resolves_to_parent_of_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let original_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(&sub).unwrap();

        let result = resolve_dir(".");

        std::env::set_current_dir(&original_cwd).unwrap();

        let resolved = result.unwrap();
        let expected = std::fs::canonicalize(&sub).unwrap();
        assert_eq!(resolved, expected.parent().unwrap());
    }

    #[test]
    fn missing_directory_is_einval() {
        let err = resolve_dir("/does/not/exist-xyz").unwrap_err();
        assert_eq!(err.exit_code, libc::EINVAL);
    }
}
