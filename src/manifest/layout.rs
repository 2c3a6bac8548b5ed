//! Source layout of an environment manifest.
//!
//! YAML parsers drop comments, but conda environment files group their
//! dependencies with comment headers (`# basic`, `# doc`, ...). This scanner
//! walks the raw text once and records, for every dependency list item, its
//! line number and the group header in force at that point.

use super::environment::DependencyGroup;

/// Line and group of one dependency list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    /// 1-indexed source line.
    pub line: usize,
    pub group: DependencyGroup,
}

/// Locations of the dependency items, split by installer.
#[derive(Debug, Clone, Default)]
pub struct DependencyLayout {
    pub conda: Vec<EntryLocation>,
    pub pip: Vec<EntryLocation>,
}

/// Scan the dependency block of an environment manifest.
pub fn scan(content: &str) -> DependencyLayout {
    let mut layout = DependencyLayout::default();
    let mut in_dependencies = false;
    let mut in_pip = false;
    let mut group = DependencyGroup::Ungrouped;
    let mut item_indent: Option<usize> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if indent == 0 && !trimmed.starts_with('#') && !trimmed.starts_with('-') {
            let key = trimmed.split(':').next().unwrap_or("").trim();
            in_dependencies = key == "dependencies";
            in_pip = false;
            item_indent = None;
            group = DependencyGroup::Ungrouped;
            continue;
        }

        if !in_dependencies {
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            if let Some(g) = DependencyGroup::from_comment(comment) {
                group = g;
            }
            continue;
        }

        let Some(item) = trimmed.strip_prefix('-') else {
            continue;
        };
        let item = item.trim();
        let top_indent = *item_indent.get_or_insert(indent);

        if indent <= top_indent {
            in_pip = item.starts_with("pip:");
            if !in_pip {
                layout.conda.push(EntryLocation {
                    line: line_no,
                    group: group.clone(),
                });
            }
        } else if in_pip {
            layout.pip.push(EntryLocation {
                line: line_no,
                group: group.clone(),
            });
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"name: pypots-dev
channels:
  - conda-forge
  # not a group header
dependencies:
  # basic
  - conda-forge::python
  - conda-forge::numpy

  # optional
  - pyg::pyg
  # doc
  - conda-forge::sphinx
  - pip
  - pip:
      - sphinxcontrib-gtagjs
      # dev
      - black
"#;

    #[test]
    fn records_conda_items_with_groups() {
        let layout = scan(MANIFEST);
        assert_eq!(layout.conda.len(), 5);
        assert_eq!(
            layout.conda[0],
            EntryLocation {
                line: 7,
                group: DependencyGroup::Basic
            }
        );
        assert_eq!(layout.conda[2].group, DependencyGroup::Optional);
        assert_eq!(layout.conda[3].group, DependencyGroup::Doc);
        assert_eq!(layout.conda[4].line, 14);
    }

    #[test]
    fn records_pip_items_with_groups() {
        let layout = scan(MANIFEST);
        assert_eq!(layout.pip.len(), 2);
        assert_eq!(layout.pip[0].line, 16);
        assert_eq!(layout.pip[0].group, DependencyGroup::Doc);
        assert_eq!(layout.pip[1].group, DependencyGroup::Dev);
    }

    #[test]
    fn ignores_other_sections() {
        let layout = scan("channels:\n  - a\n  - b\n");
        assert!(layout.conda.is_empty());
        assert!(layout.pip.is_empty());
    }

    #[test]
    fn handles_zero_indent_items() {
        let layout = scan("dependencies:\n# test\n- pytest\n- pip:\n  - pytest-cov\n");
        assert_eq!(layout.conda.len(), 1);
        assert_eq!(layout.conda[0].group, DependencyGroup::Test);
        assert_eq!(layout.pip.len(), 1);
        assert_eq!(layout.pip[0].group, DependencyGroup::Test);
    }

    #[test]
    fn items_without_header_are_ungrouped() {
        let layout = scan("dependencies:\n  - numpy\n");
        assert_eq!(layout.conda[0].group, DependencyGroup::Ungrouped);
    }
}
