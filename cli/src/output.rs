//! Output formatting for models and enums.

use schema_registry_core::{ColumnMetadata, EnumMetadata, FilterSpec, ModelMetadata};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// One enum column, as listed by the `enums` command.
#[derive(Debug, Serialize)]
pub struct EnumRow<'a> {
    pub model: &'a str,
    pub column: &'a str,
    #[serde(flatten)]
    pub metadata: &'a EnumMetadata,
}

/// Formats models in the requested output format.
pub fn format_models(models: &[&ModelMetadata], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(models)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(models).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(models
            .iter()
            .map(|m| model_to_markdown(m))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => Ok(models
            .iter()
            .map(|m| model_to_table(m))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Formats enum rows in the requested output format.
pub fn format_enums(rows: &[EnumRow<'_>], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(rows)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(rows).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(enums_to_markdown(rows)),
        OutputFormat::Table => Ok(enums_to_table(rows)),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn filter_label(filter: &FilterSpec) -> String {
    match filter {
        FilterSpec::Enabled(enabled) => yes_no(*enabled).to_string(),
        FilterSpec::Operators(ops) => ops
            .iter()
            .map(|op| format!("{op:?}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn type_label(column: &ColumnMetadata) -> String {
    let base = match column.enum_name.as_deref() {
        Some(name) => format!("enum {name}"),
        None => column.field_type.to_string(),
    };
    if column.is_array {
        format!("{base}[]")
    } else {
        base
    }
}

fn model_flags(model: &ModelMetadata) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if model.is_abstract() {
        flags.push("abstract");
    }
    if model.is_api_only() {
        flags.push("api only");
    }
    if model.is_db_only() {
        flags.push("db only");
    }
    flags
}

fn model_to_markdown(model: &ModelMetadata) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", model.name));

    if let Some(ref location) = model.location {
        out.push_str(&format!("**Location:** `{location}`\n\n"));
    }

    let flags = model_flags(model);
    if !flags.is_empty() {
        out.push_str(&format!("**Flags:** {}\n\n", flags.join(", ")));
    }

    if !model.columns.is_empty() {
        out.push_str("## Columns\n\n");
        out.push_str("| Column | Type | Nullable | Unique | Editable | Filter | Sort |\n");
        out.push_str("|--------|------|----------|--------|----------|--------|------|\n");
        for column in &model.columns {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} | {} | {} |\n",
                column.property_name,
                type_label(column),
                yes_no(column.nullable),
                yes_no(column.unique),
                yes_no(column.editable),
                filter_label(&column.filter),
                yes_no(column.sort),
            ));
        }
        out.push('\n');
    }

    if !model.relations.is_empty() {
        out.push_str("## Relations\n\n");
        out.push_str("| Property | Target | List |\n");
        out.push_str("|----------|--------|------|\n");
        for relation in &model.relations {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                relation.property_name,
                relation.rel_model_name,
                yes_no(relation.is_list)
            ));
        }
        out.push('\n');
    }

    out
}

fn model_to_table(model: &ModelMetadata) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Model: {}  Columns: {}  Relations: {}",
        model.name,
        model.columns.len(),
        model.relations.len()
    ));
    let flags = model_flags(model);
    if !flags.is_empty() {
        out.push_str(&format!("  ({})", flags.join(", ")));
    }
    out.push('\n');

    if !model.columns.is_empty() {
        out.push_str("\nColumns:\n");
        let max_name = model
            .columns
            .iter()
            .map(|c| c.property_name.len())
            .max()
            .unwrap_or(4);
        let types: Vec<String> = model.columns.iter().map(type_label).collect();
        let max_type = types.iter().map(String::len).max().unwrap_or(4);

        for (column, ty) in model.columns.iter().zip(&types) {
            let mut facets = Vec::new();
            if column.nullable {
                facets.push("nullable");
            }
            if column.unique {
                facets.push("unique");
            }
            if !column.editable {
                facets.push("read-only");
            }
            if column.sort {
                facets.push("sort");
            }
            if column.filter.is_enabled() {
                facets.push("filter");
            }
            out.push_str(&format!(
                "  {:<name_width$}  {:<type_width$}  {}\n",
                column.property_name,
                ty,
                facets.join(" "),
                name_width = max_name,
                type_width = max_type,
            ));
        }
    }

    if !model.relations.is_empty() {
        out.push_str("\nRelations:\n");
        let max_name = model
            .relations
            .iter()
            .map(|r| r.property_name.len())
            .max()
            .unwrap_or(4);

        for relation in &model.relations {
            let target = if relation.is_list {
                format!("[{}]", relation.rel_model_name)
            } else {
                relation.rel_model_name.clone()
            };
            out.push_str(&format!(
                "  {:<width$}  {target}\n",
                relation.property_name,
                width = max_name
            ));
        }
    }

    out
}

fn enums_to_markdown(rows: &[EnumRow<'_>]) -> String {
    let mut out = String::new();

    out.push_str("# Enums\n\n");
    out.push_str("| Model | Column | Enum | Values |\n");
    out.push_str("|-------|--------|------|--------|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | `{}` | {} | {} |\n",
            row.model,
            row.column,
            row.metadata.name,
            row.metadata.values.join(", ")
        ));
    }

    out
}

fn enums_to_table(rows: &[EnumRow<'_>]) -> String {
    let mut out = String::new();

    let labels: Vec<String> = rows
        .iter()
        .map(|row| format!("{}.{}", row.model, row.column))
        .collect();
    let max_label = labels.iter().map(String::len).max().unwrap_or(4);
    let max_name = rows
        .iter()
        .map(|row| row.metadata.name.len())
        .max()
        .unwrap_or(4);

    for (row, label) in rows.iter().zip(&labels) {
        out.push_str(&format!(
            "{:<label_width$}  {:<name_width$}  {}\n",
            label,
            row.metadata.name,
            row.metadata.values.join(" | "),
            label_width = max_label,
            name_width = max_name,
        ));
    }

    out
}
