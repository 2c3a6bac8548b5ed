//! Documentation-build manifest (`.readthedocs.yml`, configuration version 2).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EnvdocError, Result};

/// Root of a documentation-build manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DocsManifest {
    /// Configuration file version; only `2` is accepted by the build service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<ConfigVersion>,

    /// Extra output formats besides HTML.
    #[serde(skip_serializing_if = "Formats::is_empty")]
    pub formats: Formats,

    /// Sphinx generator settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sphinx: Option<SphinxConfig>,

    /// MkDocs generator settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mkdocs: Option<MkDocsConfig>,

    /// Build image, tool pins and job hooks.
    #[serde(skip_serializing_if = "BuildConfig::is_empty")]
    pub build: BuildConfig,

    /// Main dependency-install step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<PythonConfig>,

    /// Conda environment used instead of a virtualenv.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conda: Option<CondaConfig>,
}

/// `version:` may be written as a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ConfigVersion {
    Number(u64),
    Text(String),
}

impl ConfigVersion {
    /// The version as text (`2` and `"2"` both give `"2"`).
    pub fn as_string(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

/// Output formats: the keyword `all`, or an explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Formats {
    All(AllFormats),
    List(Vec<Format>),
}

/// The `all` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AllFormats {
    All,
}

/// A downloadable documentation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Htmlzip,
    Pdf,
    Epub,
}

impl Default for Formats {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Formats {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::List(list) if list.is_empty())
    }

    /// The formats that will be produced.
    pub fn resolved(&self) -> Vec<Format> {
        match self {
            Self::All(_) => vec![Format::Htmlzip, Format::Pdf, Format::Epub],
            Self::List(list) => list.clone(),
        }
    }
}

/// Sphinx settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SphinxConfig {
    /// Path to `conf.py`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<String>,
    /// Turn warnings into build failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_warning: Option<bool>,
}

/// MkDocs settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MkDocsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_warning: Option<bool>,
}

/// A tool version pin. Unquoted pins like `3.10` arrive as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ToolVersion {
    Text(String),
    Number(f64),
}

impl ToolVersion {
    /// The pin as the build service will read it.
    pub fn as_string(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }

    /// Whether the pin was written as a YAML number.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

/// `build:` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BuildConfig {
    /// Operating-system image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Tool name to version pin.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, ToolVersion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub apt_packages: Vec<String>,
    /// Commands hooked around the standard build steps.
    #[serde(skip_serializing_if = "BuildJobs::is_empty")]
    pub jobs: BuildJobs,
    /// Commands replacing the standard build entirely.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl BuildConfig {
    pub fn is_empty(&self) -> bool {
        self.os.is_none()
            && self.tools.is_empty()
            && self.apt_packages.is_empty()
            && self.jobs.is_empty()
            && self.commands.is_empty()
    }
}

/// A build phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    PostCheckout,
    PreSystemDependencies,
    PostSystemDependencies,
    PreCreateEnvironment,
    PostCreateEnvironment,
    PreInstall,
    /// The service's own dependency install (`python.install`).
    Install,
    PostInstall,
    PreBuild,
    PostBuild,
}

impl JobPhase {
    /// Every phase in execution order.
    pub const ALL: [JobPhase; 10] = [
        JobPhase::PostCheckout,
        JobPhase::PreSystemDependencies,
        JobPhase::PostSystemDependencies,
        JobPhase::PreCreateEnvironment,
        JobPhase::PostCreateEnvironment,
        JobPhase::PreInstall,
        JobPhase::Install,
        JobPhase::PostInstall,
        JobPhase::PreBuild,
        JobPhase::PostBuild,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostCheckout => "post_checkout",
            Self::PreSystemDependencies => "pre_system_dependencies",
            Self::PostSystemDependencies => "post_system_dependencies",
            Self::PreCreateEnvironment => "pre_create_environment",
            Self::PostCreateEnvironment => "post_create_environment",
            Self::PreInstall => "pre_install",
            Self::Install => "install",
            Self::PostInstall => "post_install",
            Self::PreBuild => "pre_build",
            Self::PostBuild => "post_build",
        }
    }

    /// Whether the phase is a user hook (everything but `Install`).
    pub fn is_hook(&self) -> bool {
        !matches!(self, Self::Install)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobPhase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|p| p.as_str() == s.trim())
            .copied()
            .ok_or_else(|| format!("unknown build phase: {}", s))
    }
}

/// `build.jobs:` hooks. Command order within a phase is significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct BuildJobs {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_checkout: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_system_dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_system_dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_create_environment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_create_environment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_install: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_install: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_build: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_build: Vec<String>,
}

impl BuildJobs {
    pub fn is_empty(&self) -> bool {
        self.phases().all(|(_, commands)| commands.is_empty())
    }

    /// Commands of one hook phase. `Install` has none here.
    pub fn get(&self, phase: JobPhase) -> &[String] {
        match phase {
            JobPhase::PostCheckout => &self.post_checkout,
            JobPhase::PreSystemDependencies => &self.pre_system_dependencies,
            JobPhase::PostSystemDependencies => &self.post_system_dependencies,
            JobPhase::PreCreateEnvironment => &self.pre_create_environment,
            JobPhase::PostCreateEnvironment => &self.post_create_environment,
            JobPhase::PreInstall => &self.pre_install,
            JobPhase::Install => &[],
            JobPhase::PostInstall => &self.post_install,
            JobPhase::PreBuild => &self.pre_build,
            JobPhase::PostBuild => &self.post_build,
        }
    }

    /// Hook phases with their commands, in execution order.
    pub fn phases(&self) -> impl Iterator<Item = (JobPhase, &[String])> {
        JobPhase::ALL
            .into_iter()
            .filter(JobPhase::is_hook)
            .map(move |phase| (phase, self.get(phase)))
    }
}

/// `python:` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PythonConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<PythonInstall>,
}

/// One `python.install` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PythonInstall {
    /// `pip install -r <requirements>`
    Requirements { requirements: String },
    /// `pip install <path>[extras]`
    Package {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        extra_requirements: Vec<String>,
    },
}

impl PythonInstall {
    /// The shell command the build service runs for this entry.
    ///
    /// `method: setuptools` runs the package's `setup.py`; any other method
    /// installs through pip.
    pub fn to_command(&self) -> String {
        match self {
            Self::Requirements { requirements } => {
                format!("python -m pip install -r {}", shell_quote(requirements))
            }
            Self::Package {
                path,
                method: Some(method),
                ..
            } if method == "setuptools" => {
                let setup = format!("{}/setup.py", path.trim_end_matches('/'));
                format!("python {} install --force", shell_quote(&setup))
            }
            Self::Package {
                path,
                extra_requirements,
                ..
            } => {
                let target = if extra_requirements.is_empty() {
                    path.clone()
                } else {
                    format!("{}[{}]", path, extra_requirements.join(","))
                };
                format!("python -m pip install {}", shell_quote(&target))
            }
        }
    }
}

/// Single-quote a word unless it is made only of shell-inert characters.
fn shell_quote(word: &str) -> String {
    let inert = |c: char| c.is_ascii_alphanumeric() || "-_./=:@+%,".contains(c);
    if !word.is_empty() && word.chars().all(inert) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// `conda:` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CondaConfig {
    /// Path to the environment manifest.
    pub environment: String,
}

impl DocsManifest {
    /// Load and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` if the file doesn't exist.
    /// Returns `ManifestParseError` if the YAML is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EnvdocError::ManifestNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                EnvdocError::Io(e)
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse manifest text.
    pub fn parse(content: &str, source_path: &Path) -> Result<Self> {
        let parse_error = |e: serde_yaml::Error| EnvdocError::ManifestParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        };
        let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(parse_error)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(parse_error)
    }

    /// The configuration version as text, if declared.
    pub fn version_string(&self) -> Option<String> {
        self.version.as_ref().map(ConfigVersion::as_string)
    }

    /// Commands of the synthetic `Install` step, from `python.install`.
    pub fn install_commands(&self) -> Vec<String> {
        self.python
            .as_ref()
            .map(|p| p.install.iter().map(PythonInstall::to_command).collect())
            .unwrap_or_default()
    }

    /// Every phase with its commands, `Install` included, in execution order.
    pub fn ordered_commands(&self) -> Vec<(JobPhase, Vec<String>)> {
        JobPhase::ALL
            .into_iter()
            .map(|phase| {
                let commands = if phase == JobPhase::Install {
                    self.install_commands()
                } else {
                    self.build.jobs.get(phase).to_vec()
                };
                (phase, commands)
            })
            .collect()
    }

    /// Explicit warning-to-failure policy of whichever generator is used.
    pub fn fail_on_warning(&self) -> Option<bool> {
        self.sphinx
            .as_ref()
            .and_then(|s| s.fail_on_warning)
            .or_else(|| self.mkdocs.as_ref().and_then(|m| m.fail_on_warning))
    }
}
