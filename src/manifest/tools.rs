//! Build images and tool versions accepted by the hosted docs build service.

/// Supported `build.os` images.
pub const SUPPORTED_OS: &[&str] = &[
    "ubuntu-20.04",
    "ubuntu-22.04",
    "ubuntu-24.04",
    "ubuntu-lts-latest",
];

/// Supported `build.tools` pins, per tool.
pub const SUPPORTED_TOOLS: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "2.7",
            "3",
            "3.6",
            "3.7",
            "3.8",
            "3.9",
            "3.10",
            "3.11",
            "3.12",
            "3.13",
            "latest",
            "miniconda3-4.7",
            "miniconda3-3.12-24.1",
            "miniconda3-3.12-24.9",
            "miniconda-latest",
            "mambaforge-4.10",
            "mambaforge-22.9",
            "mambaforge-23.11",
            "mambaforge-latest",
        ],
    ),
    ("nodejs", &["14", "16", "18", "19", "20", "22", "23", "latest"]),
    ("ruby", &["3.3", "latest"]),
    (
        "rust",
        &["1.55", "1.61", "1.64", "1.70", "1.75", "1.78", "1.82", "1.86", "latest"],
    ),
    (
        "golang",
        &["1.17", "1.18", "1.19", "1.20", "1.21", "1.22", "1.23", "1.24", "latest"],
    ),
];

pub fn is_supported_os(os: &str) -> bool {
    SUPPORTED_OS.contains(&os)
}

/// Versions supported for `tool`, or `None` for an unknown tool.
pub fn supported_versions(tool: &str) -> Option<&'static [&'static str]> {
    SUPPORTED_TOOLS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, versions)| *versions)
}

/// Whether `tool` accepts the pin `version`.
pub fn is_supported_tool_version(tool: &str, version: &str) -> bool {
    supported_versions(tool).is_some_and(|versions| versions.contains(&version))
}

/// Whether a python pin selects a conda-based interpreter.
pub fn is_conda_python(version: &str) -> bool {
    version.starts_with("miniconda") || version.starts_with("mambaforge")
}
