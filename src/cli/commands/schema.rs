//! Implementation of the `adaptui schema` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{ComponentDefinition, Config};
use crate::infrastructure::setup;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub name: String,
    pub description: String,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub preferred_size: [u32; 2],
}

impl From<&ComponentDefinition> for ComponentSummary {
    fn from(def: &ComponentDefinition) -> Self {
        let (required, optional): (Vec<_>, Vec<_>) =
            def.arguments.iter().partition(|(_, spec)| spec.required);
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            required: required.into_iter().map(|(name, _)| name.clone()).collect(),
            optional: optional.into_iter().map(|(name, _)| name.clone()).collect(),
            preferred_size: [
                def.space_hint.preferred.width(),
                def.space_hint.preferred.height(),
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SchemaOutput {
    pub components: Vec<ComponentSummary>,
}

impl CommandOutput for SchemaOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["type", "required", "optional", "size", "description"]);
        for component in &self.components {
            let [w, h] = component.preferred_size;
            table.add_row(vec![
                component.name.clone(),
                component.required.join(", "),
                component.optional.join(", "),
                format!("{w}x{h}"),
                truncate(&component.description, 50),
            ]);
        }
        render_list("element type", &table, self.components.len())
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let schema = setup::load_schema(config)?;
    let out = SchemaOutput {
        components: schema
            .definitions()
            .iter()
            .map(ComponentSummary::from)
            .collect(),
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ArgumentSpec, ArgumentType, Size, SpaceHint};
    use std::collections::BTreeMap;

    #[test]
    fn test_component_summary_splits_arguments() {
        let def = ComponentDefinition {
            name: "MetricCard".to_string(),
            description: "One KPI".to_string(),
            arguments: BTreeMap::from([
                ("label".to_string(), ArgumentSpec::required(ArgumentType::Text)),
                ("trend".to_string(), ArgumentSpec::new(ArgumentType::Text)),
            ]),
            use_cases: vec!["show a number".to_string()],
            space_hint: SpaceHint {
                min: Size(2, 2),
                max: Size(4, 3),
                preferred: Size(3, 2),
            },
        };
        let summary = ComponentSummary::from(&def);
        assert_eq!(summary.required, vec!["label"]);
        assert_eq!(summary.optional, vec!["trend"]);
        assert_eq!(summary.preferred_size, [3, 2]);

        let human = SchemaOutput {
            components: vec![summary],
        }
        .to_human();
        assert!(human.contains("MetricCard"));
        assert!(human.contains("3x2"));
    }
}
