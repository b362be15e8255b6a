//! Path helpers for source map references.

use std::path::{Component, Path, PathBuf};

/// Lexically resolve `.` and `..` components. A `..` consumes the preceding
/// normal component, disappears at the root, and survives at the front of a
/// relative path where nothing is left to consume.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last().copied() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            part => parts.push(part),
        }
    }
    parts.into_iter().collect()
}

/// Relative path from `base` to `target`, computed purely on components.
///
/// Mirrors how JavaScript tooling derives map sources: resolve `.` and `..`
/// in both paths, strip the common prefix, climb out of what remains of
/// `base` with `..`, then descend into `target`. No filesystem access, no
/// symlink resolution. Both paths must be either absolute or relative to the
/// same root for the result to make sense.
pub(crate) fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for component in &target_parts[common..] {
        relative.push(component);
    }
    relative
}

/// The `sources` entry recorded for a stitched file: the path from the
/// bundle's directory to the file, separated by forward slashes regardless
/// of platform so the map stays portable.
pub(crate) fn source_reference(destination: &Path, file: &Path) -> String {
    let base = destination.parent().unwrap_or_else(|| Path::new(""));
    let relative = relative_path(base, file);

    let mut reference = String::new();
    for component in relative.components() {
        if !reference.is_empty() {
            reference.push('/');
        }
        reference.push_str(&component.as_os_str().to_string_lossy());
    }
    reference
}
