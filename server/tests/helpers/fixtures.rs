//! Fixture project scaffolding utilities for integration tests.

use std::path::{Path, PathBuf};

/// Recursively copy a directory tree. Preserves file contents but not metadata.
pub fn copy_dir_recursive(src: &Path, dst: &Path) {
    std::fs::create_dir_all(dst).expect("Failed to create dir");
    for entry in std::fs::read_dir(src).expect("Failed to read dir") {
        let entry = entry.expect("Failed to read entry");
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path);
        } else {
            std::fs::copy(&src_path, &dst_path).expect("Failed to copy file");
        }
    }
}

/// Install a stand-in for `npm run` in `dir`.
///
/// With `sh` as the npm command, `sh run <script>` executes this file with the
/// script name as `$1`. It echoes the script name to stdout, writes a marker to
/// stderr and exits with 3 when the script is named `fail`.
pub fn write_fake_npm(dir: &Path) -> PathBuf {
    let path = dir.join("run");
    let script = r#"echo "running $1 in $(basename "$(pwd -P)")"
echo "stderr from $1" >&2
if [ "$1" = "fail" ]; then
  exit 3
fi
exit 0
"#;
    std::fs::write(&path, script).expect("Failed to write fake npm");
    path
}
