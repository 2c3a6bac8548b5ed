//! Recognizing package installs and removals inside build-job shell commands.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::requirement::{normalize_name, MatchSpec, PipRequirement};

static ENV_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").expect("valid env assignment regex")
});

/// Pip flags that consume the following word.
const PIP_VALUE_FLAGS: &[&str] = &[
    "-f",
    "--find-links",
    "-i",
    "--index-url",
    "--extra-index-url",
    "-c",
    "--constraint",
    "-t",
    "--target",
    "--prefix",
    "--root",
    "--python",
    "--trusted-host",
    "--upgrade-strategy",
    "--no-binary",
    "--only-binary",
    "--platform",
    "--python-version",
    "--implementation",
    "--abi",
    "--cache-dir",
    "--src",
    "--progress-bar",
    "--log",
    "--proxy",
    "--retries",
    "--timeout",
    "--exists-action",
    "--cert",
    "--client-cert",
    "--global-option",
    "--config-settings",
];

/// Conda flags that consume the following word.
const CONDA_VALUE_FLAGS: &[&str] = &["-c", "--channel", "-n", "--name", "-p", "--prefix"];

/// Which installer a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Installer {
    Pip,
    Conda,
}

impl std::fmt::Display for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pip => write!(f, "pip"),
            Self::Conda => write!(f, "conda"),
        }
    }
}

/// Whether a command adds or removes packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    Install,
    Remove,
}

impl std::fmt::Display for PackageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Install => write!(f, "installs"),
            Self::Remove => write!(f, "removes"),
        }
    }
}

/// One thing an install command asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InstallTarget {
    /// A named package.
    Package {
        /// Normalized package name.
        name: String,
        /// Requirement as written.
        requirement: String,
    },
    /// A requirements file, editable install, path or URL.
    Opaque { target: String },
}

/// A recognized install or uninstall invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallCommand {
    pub installer: Installer,
    pub action: PackageAction,
    pub targets: Vec<InstallTarget>,
}

/// One simple command of a (possibly chained) shell line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShellStep {
    Install(InstallCommand),
    Other { command: String },
}

impl InstallCommand {
    /// Parse a shell line into its simple commands, recognizing installs.
    ///
    /// Chains joined by `&&`, `||`, `;` or `|` are split. A line with an
    /// unterminated quote is kept whole as `Other`.
    pub fn parse(command: &str) -> Vec<ShellStep> {
        let segments = match split_words(command) {
            Ok(segments) => segments,
            Err(message) => {
                tracing::debug!("Not replaying {:?}: {}", command, message);
                return vec![ShellStep::Other {
                    command: command.trim().to_string(),
                }];
            }
        };

        segments
            .into_iter()
            .filter(|words| !words.is_empty())
            .map(|words| match Self::from_words(&words) {
                Some(install) => ShellStep::Install(install),
                None => ShellStep::Other {
                    command: words.join(" "),
                },
            })
            .collect()
    }

    /// Recognize an install or uninstall from the words of one simple command.
    pub fn from_words(words: &[String]) -> Option<Self> {
        let mut rest = words
            .iter()
            .map(String::as_str)
            .skip_while(|w| ENV_ASSIGNMENT.is_match(w) || *w == "sudo");

        let program = rest.next()?;
        let program = program.rsplit('/').next().unwrap_or(program);
        let args: Vec<&str> = rest.collect();

        let pip_args = if is_pip(program) {
            Some(args.as_slice())
        } else if is_python(program) {
            args.strip_prefix(&["-m", "pip"])
        } else if program == "uv" {
            args.strip_prefix(&["pip"])
        } else {
            None
        };
        if let Some(pip_args) = pip_args {
            let (verb, args) = pip_args.split_first()?;
            let action = match *verb {
                "install" => PackageAction::Install,
                "uninstall" => PackageAction::Remove,
                _ => return None,
            };
            return Some(Self::pip(action, args));
        }

        if matches!(program, "conda" | "mamba" | "micromamba") {
            let (verb, args) = args.split_first()?;
            let action = match *verb {
                "install" => PackageAction::Install,
                "remove" | "uninstall" => PackageAction::Remove,
                _ => return None,
            };
            return Some(Self::conda(action, args));
        }
        None
    }

    fn pip(action: PackageAction, args: &[&str]) -> Self {
        let mut targets = Vec::new();
        let mut iter = args.iter();
        while let Some(&arg) = iter.next() {
            match arg {
                "-r" | "--requirement" | "-e" | "--editable" => {
                    if let Some(value) = iter.next() {
                        targets.push(InstallTarget::Opaque {
                            target: format!("{} {}", arg, value),
                        });
                    }
                }
                flag if PIP_VALUE_FLAGS.contains(&flag) => {
                    iter.next();
                }
                flag if flag.starts_with('-') => {
                    if let Some(value) = flag
                        .strip_prefix("--requirement=")
                        .or_else(|| flag.strip_prefix("--editable="))
                    {
                        targets.push(InstallTarget::Opaque {
                            target: value.to_string(),
                        });
                    }
                }
                target => targets.push(pip_target(target)),
            }
        }
        Self {
            installer: Installer::Pip,
            action,
            targets,
        }
    }

    fn conda(action: PackageAction, args: &[&str]) -> Self {
        let mut targets = Vec::new();
        let mut iter = args.iter();
        while let Some(&arg) = iter.next() {
            match arg {
                "--file" => {
                    if let Some(value) = iter.next() {
                        targets.push(InstallTarget::Opaque {
                            target: format!("--file {}", value),
                        });
                    }
                }
                flag if CONDA_VALUE_FLAGS.contains(&flag) => {
                    iter.next();
                }
                flag if flag.starts_with('-') => {}
                target => targets.push(match MatchSpec::parse(target) {
                    Ok(spec) => InstallTarget::Package {
                        name: spec.normalized_name(),
                        requirement: target.to_string(),
                    },
                    Err(_) => InstallTarget::Opaque {
                        target: target.to_string(),
                    },
                }),
            }
        }
        Self {
            installer: Installer::Conda,
            action,
            targets,
        }
    }

    /// Normalized names of the named packages this command installs or removes.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().filter_map(|t| match t {
            InstallTarget::Package { name, requirement } => {
                Some((name.as_str(), requirement.as_str()))
            }
            InstallTarget::Opaque { .. } => None,
        })
    }
}

fn pip_target(target: &str) -> InstallTarget {
    match PipRequirement::parse(target) {
        Ok(req) => match req.name.as_deref() {
            Some(name) => InstallTarget::Package {
                name: normalize_name(name),
                requirement: target.to_string(),
            },
            None => InstallTarget::Opaque {
                target: target.to_string(),
            },
        },
        Err(_) => InstallTarget::Opaque {
            target: target.to_string(),
        },
    }
}

fn is_pip(program: &str) -> bool {
    program == "pip"
        || program
            .strip_prefix("pip")
            .is_some_and(|v| v.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

fn is_python(program: &str) -> bool {
    program
        .strip_prefix("python")
        .is_some_and(|v| v.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

/// Split a shell line into simple commands, each a list of words.
///
/// Single quotes are literal, double quotes allow backslash escapes of
/// `"`, `\`, `$` and `` ` ``, and a bare backslash escapes the next char.
pub fn split_words(line: &str) -> Result<Vec<Vec<String>>, String> {
    let mut segments = Vec::new();
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => word.push(ch),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&next @ ('"' | '\\' | '$' | '`')) => {
                                word.push(next);
                                chars.next();
                            }
                            _ => word.push('\\'),
                        },
                        Some(ch) => word.push(ch),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    if next != '\n' {
                        word.push(next);
                        in_word = true;
                    }
                }
            }
            '#' if !in_word => break,
            ';' | '&' | '|' => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
                if (c == '&' || c == '|') && chars.peek() == Some(&c) {
                    chars.next();
                }
                segments.push(std::mem::take(&mut words));
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(word);
    }
    segments.push(words);
    Ok(segments)
}
