//! Mount-point detection for removable and network media

use std::fs;
use std::path::{Path, PathBuf};

/// Whether `path` is currently the root of a mounted filesystem.
///
/// On Linux the kernel mount table is consulted first, which also catches
/// bind mounts on the same device. Elsewhere, and when the table cannot be
/// read, a path is a mount point if it lives on a different device than its
/// parent or is the filesystem root.
pub fn is_mount_point(path: &Path) -> bool {
    let Ok(canonical) = path.canonicalize() else {
        return false;
    };
    if !canonical.is_dir() {
        return false;
    }

    #[cfg(target_os = "linux")]
    if let Ok(table) = fs::read_to_string("/proc/self/mountinfo") {
        return parse_mountinfo(&table).iter().any(|m| *m == canonical);
    }

    differs_from_parent(&canonical)
}

#[cfg(unix)]
fn differs_from_parent(canonical: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let Some(parent) = canonical.parent() else {
        return true;
    };
    match (fs::metadata(canonical), fs::metadata(parent)) {
        (Ok(own), Ok(up)) => own.dev() != up.dev() || own.ino() == up.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn differs_from_parent(canonical: &Path) -> bool {
    canonical.parent().is_none()
}

/// Extract mount points from `/proc/self/mountinfo` content.
///
/// The fifth field is the mount point, with whitespace and backslashes
/// octal-escaped by the kernel.
pub fn parse_mountinfo(table: &str) -> Vec<PathBuf> {
    table
        .lines()
        .filter_map(|line| line.split(' ').nth(4))
        .map(|field| PathBuf::from(unescape_octal(field)))
        .collect()
}

fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escape = bytes
            .get(i + 1..i + 4)
            .filter(|digits| bytes[i] == b'\\' && digits.iter().all(|b| (b'0'..=b'7').contains(b)))
            .map(|digits| digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0')));

        if let Some(value) = escape.and_then(|v| u8::try_from(v).ok()) {
            out.push(value);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
