//! Schema command implementation.
//!
//! The `envdoc schema` command prints the JSON Schema of the environment
//! manifest, the docs build manifest or the settings file, for editor
//! integration.

use schemars::schema_for;

use crate::cli::args::{SchemaArgs, SchemaTarget};
use crate::config::Settings;
use crate::error::Result;
use crate::manifest::{DocsManifest, EnvironmentFile};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand {
    args: SchemaArgs,
}

impl SchemaCommand {
    /// Create a new schema command.
    pub fn new(args: SchemaArgs) -> Self {
        Self { args }
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = match self.args.target {
            SchemaTarget::Env => schema_for!(EnvironmentFile),
            SchemaTarget::Docs => schema_for!(DocsManifest),
            SchemaTarget::Settings => schema_for!(Settings),
        };
        let json = serde_json::to_string_pretty(&schema).map_err(anyhow::Error::from)?;
        ui.message(&json);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    fn schema(target: SchemaTarget) -> serde_json::Value {
        let mut ui = MockUI::new();
        let result = SchemaCommand::new(SchemaArgs { target })
            .execute(&mut ui)
            .unwrap();
        assert!(result.success);
        serde_json::from_str(&ui.messages()[0]).unwrap()
    }

    #[test]
    fn environment_schema_has_dependencies() {
        let value = schema(SchemaTarget::Env);
        assert!(value["properties"]["dependencies"].is_object());
        assert!(value["properties"]["channels"].is_object());
    }

    #[test]
    fn docs_schema_has_build() {
        let value = schema(SchemaTarget::Docs);
        assert!(value["properties"]["build"].is_object());
    }

    #[test]
    fn settings_schema_lists_rules() {
        let value = schema(SchemaTarget::Settings);
        assert!(value["properties"]["rules"].is_object());
        assert_eq!(value["additionalProperties"], false);
    }
}
