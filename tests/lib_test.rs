//! Library integration tests.

use std::path::PathBuf;

use envdoc::EnvdocError;

#[test]
fn error_types_are_public() {
    let err = EnvdocError::ManifestNotFound {
        path: PathBuf::from("environment-dev.yml"),
    };
    assert!(err.to_string().contains("environment-dev.yml"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> envdoc::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use envdoc::cli::{Cli, Commands};

    let cli = Cli::parse_from(["envdoc", "replay", "--json"]);
    if let Some(Commands::Replay(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Replay command");
    }
}

#[test]
fn mock_ui_is_public() {
    use envdoc::ui::{MockUI, UserInterface};

    let mut ui = MockUI::new();
    ui.warning("docutils pin undone");
    assert!(ui.has_warning("docutils"));
}
