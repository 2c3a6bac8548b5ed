//! Integration tests for loading and rendering the fixture manifests.

use std::path::Path;

use envdoc::manifest::{
    check_round_trip_docs, check_round_trip_environment, DependencyGroup, DocsManifest,
    EnvironmentManifest, Format, JobPhase,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pypots");

fn environment() -> EnvironmentManifest {
    EnvironmentManifest::load(&Path::new(FIXTURE).join("environment-dev.yml")).unwrap()
}

fn docs() -> DocsManifest {
    DocsManifest::load(&Path::new(FIXTURE).join(".readthedocs.yml")).unwrap()
}

fn group_size(env: &EnvironmentManifest, group: DependencyGroup) -> usize {
    env.dependencies.iter().filter(|d| d.group == group).count()
}

#[test]
fn environment_groups_follow_comment_headers() {
    let env = environment();
    assert_eq!(env.name.as_deref(), Some("pypots-dev"));
    assert_eq!(env.channels, ["conda-forge", "pytorch", "pyg", "nodefaults"]);

    assert_eq!(group_size(&env, DependencyGroup::Basic), 14);
    assert_eq!(group_size(&env, DependencyGroup::Optional), 3);
    assert_eq!(group_size(&env, DependencyGroup::Test), 2);
    assert_eq!(group_size(&env, DependencyGroup::Doc), 7);
    assert_eq!(group_size(&env, DependencyGroup::Dev), 4);
    assert_eq!(env.pip_dependencies().count(), 2);
}

#[test]
fn referenced_channels_are_declared() {
    let env = environment();
    for channel in env.referenced_channels() {
        assert!(env.declares_channel(channel), "{} not declared", channel);
    }
}

#[test]
fn docs_phases_run_in_order() {
    let docs = docs();
    assert_eq!(docs.version_string().as_deref(), Some("2"));

    let phases: Vec<JobPhase> = docs
        .ordered_commands()
        .into_iter()
        .filter(|(_, commands)| !commands.is_empty())
        .map(|(phase, _)| phase)
        .collect();
    assert_eq!(phases, [JobPhase::PreInstall, JobPhase::PostInstall]);
    assert_eq!(docs.build.jobs.get(JobPhase::PostInstall), ["pip install docutils==0.20"]);
    assert_eq!(docs.formats.resolved(), [Format::Htmlzip, Format::Pdf, Format::Epub]);
    assert_eq!(docs.fail_on_warning(), Some(false));
}

#[test]
fn fixture_manifests_round_trip() {
    let env_text =
        check_round_trip_environment(&environment(), Path::new("environment-dev.yml")).unwrap();
    assert!(env_text.contains("  # doc\n"));

    let docs_text = check_round_trip_docs(&docs(), Path::new(".readthedocs.yml")).unwrap();
    assert!(docs_text.contains("- htmlzip\n"));
    let reparsed = DocsManifest::parse(&docs_text, Path::new(".readthedocs.yml")).unwrap();
    assert_eq!(reparsed, docs());
}
