use std::fs::{OpenOptions, Permissions};
use std::io;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

/// Writes `contents` to a file only its owner can access. Refuses to touch
/// an existing file unless `overwrite` is set.
pub fn write_private(
    path: &Path,
    contents: impl AsRef<str>,
    overwrite: bool,
) -> Result<(), io::Error> {
    let mut options = OpenOptions::new();
    options.mode(0o600).write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options.open(path)?;
    file.set_permissions(Permissions::from_mode(0o600))?;
    file.write_all(contents.as_ref().as_bytes())?;
    file.sync_all()
}
