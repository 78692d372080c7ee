use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos").join("projects")
}

pub fn demo_dir(name: &str) -> PathBuf {
    demos_root().join(name)
}

pub fn testcase_path(name: &str) -> PathBuf {
    demo_dir(name).join("testcase.json")
}

/// Demo project names, sorted.
pub fn demo_names() -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(demos_root()) else {
        return Vec::new();
    };
    let mut names = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    names.sort();
    names
}
