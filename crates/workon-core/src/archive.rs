use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use sha2::{Digest, Sha256};
use tar::{Archive, EntryType};
use workon_backend::BackendError;

fn unsafe_member(path: &Path) -> bool {
    path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
}

fn escapes_destination(member: &Path) -> BackendError {
    BackendError::extract(
        member,
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "archive member escapes the install directory",
        ),
    )
}

/// Unpack a gzip-compressed tarball below `dest`, recreating each member with
/// the mode recorded in the archive. Returns the number of members written.
///
/// # Errors
/// Returns [`BackendError::ExtractError`] for members that cannot be written
/// or whose path escapes `dest`.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<u64, BackendError> {
    let file = File::open(archive_path)
        .map_err(|error| BackendError::io(format!("open {}", archive_path.display()), error))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    std::fs::create_dir_all(dest).map_err(|error| BackendError::extract(dest, error))?;

    let entries = archive
        .entries()
        .map_err(|error| BackendError::extract(archive_path, error))?;
    let mut written = 0_u64;

    for entry in entries {
        let mut entry = entry.map_err(|error| BackendError::extract(archive_path, error))?;
        let entry_type = entry.header().entry_type();
        if matches!(entry_type, EntryType::XGlobalHeader | EntryType::XHeader) {
            continue;
        }

        let member: PathBuf = entry
            .path()
            .map_err(|error| BackendError::extract(archive_path, error))?
            .into_owned();
        if unsafe_member(&member) {
            return Err(escapes_destination(&member));
        }

        let out_path = dest.join(&member);
        entry.set_preserve_permissions(true);
        // `unpack_in` refuses to write through symlinks that leave `dest`.
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|error| BackendError::extract(&out_path, error))?;
        if !unpacked {
            return Err(escapes_destination(&member));
        }
        written += 1;
    }

    debug!(
        "Extracted {written} members from {} into {}",
        archive_path.display(),
        dest.display()
    );
    Ok(written)
}

/// Lowercase hex SHA-256 of the file at `path`.
///
/// # Errors
/// Returns an error when the file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String, BackendError> {
    let context = || format!("read {} for checksum", path.display());
    let mut file = File::open(path).map_err(|error| BackendError::io(context(), error))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|error| BackendError::io(context(), error))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
