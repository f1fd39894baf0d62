use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value as Json};
use tracing::info;
use weft_sdk::{
    form_from_json, object_from_json, object_to_json, FormData, Mapper, MapperConfig, Object,
    SaveSummary, Schema, TypeName,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Types(args) => cmd_types(args, &cli.format)?,
        Command::Render(args) => cmd_render(args, &cli.format).await?,
        Command::Input(args) => cmd_input(args, &cli.format).await?,
        Command::Save(args) => cmd_save(args, &cli.format).await?,
    };
    println!("{output}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> anyhow::Result<Json> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

async fn open_mapper(args: &MapperArgs) -> anyhow::Result<Mapper> {
    let schema = Schema::from_file(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let mut builder = Mapper::builder(schema);
    if let Some(path) = &args.config {
        let config = MapperConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?;
        builder = builder.config(config);
    }
    let mapper = builder.build()?;
    if let Some(path) = &args.seed {
        seed(&mapper, path).await?;
    }
    Ok(mapper)
}

async fn seed(mapper: &Mapper, path: &Path) -> anyhow::Result<()> {
    let Json::Object(types) = read_json(path)? else {
        bail!("{}: expected an object of type names", path.display());
    };
    let mut saved = 0usize;
    for (type_name, items) in types {
        let Json::Array(items) = items else {
            bail!("{}: {type_name} must map to an array", path.display());
        };
        let type_name = TypeName::new(type_name);
        for item in items {
            let mut object = object_from_json(mapper.schema(), &mapper.config().naming, &type_name, &item)?;
            mapper.save(&mut object).await?;
            saved += 1;
        }
    }
    info!(objects = saved, "seeded store");
    Ok(())
}

fn load_object(mapper: &Mapper, args: &ObjectArgs) -> anyhow::Result<Object> {
    let json = match &args.object {
        Some(path) => read_json(path)?,
        None => json!({}),
    };
    let type_name = TypeName::new(args.type_name.as_str());
    Ok(object_from_json(mapper.schema(), &mapper.config().naming, &type_name, &json)?)
}

fn load_form(path: &Path) -> anyhow::Result<FormData> {
    Ok(form_from_json(&read_json(path)?)?)
}

fn pretty(json: &Json) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(json)?)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_types(args: TypesArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let schema = Schema::from_file(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let declared: Vec<_> = schema.type_names().filter_map(|name| schema.get(name)).collect();
    if let OutputFormat::Json = format {
        return Ok(serde_json::to_string_pretty(&declared)?);
    }
    let mut lines = Vec::new();
    for t in declared {
        lines.push(t.name.to_string().bold().to_string());
        for p in &t.properties {
            lines.push(format!("  {}: {}", p.name, p.property_type.to_string().cyan()));
        }
    }
    Ok(lines.join("\n"))
}

async fn cmd_render(args: RenderArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let mapper = open_mapper(&args.mapper).await?;
    let object = load_object(&mapper, &args.target)?;
    match args.mode {
        RenderMode::Edit => {
            let html = mapper.render_edit(&object).await?;
            match format {
                OutputFormat::Json => pretty(&json!({ "html": html })),
                OutputFormat::Text => Ok(html),
            }
        }
        RenderMode::Output => {
            let rendered = mapper.render_output(&object, args.mandatory_container).await?;
            match format {
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&rendered)?),
                OutputFormat::Text => Ok(rendered
                    .iter()
                    .map(|(property, html)| format!("{}: {html}", property.bold()))
                    .collect::<Vec<_>>()
                    .join("\n")),
            }
        }
    }
}

async fn cmd_input(args: InputArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let mapper = open_mapper(&args.mapper).await?;
    let mut object = load_object(&mapper, &args.target)?;
    let form = load_form(&args.form)?;
    mapper.apply_input(&mut object, &form).await?;
    let json = object_to_json(&object);
    match format {
        OutputFormat::Json => pretty(&json),
        OutputFormat::Text => Ok(format!("{} {}\n{}", "✓".green().bold(), "Form applied".bold(), pretty(&json)?)),
    }
}

async fn cmd_save(args: SaveArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let mapper = open_mapper(&args.mapper).await?;
    let mut object = load_object(&mapper, &args.target)?;
    if let Some(path) = &args.form {
        mapper.apply_input(&mut object, &load_form(path)?).await?;
    }
    let summary = mapper.save(&mut object).await?;
    match format {
        OutputFormat::Json => pretty(&json!({
            "summary": serde_json::to_value(&summary)?,
            "object": object_to_json(&object),
        })),
        OutputFormat::Text => Ok(describe_save(&summary)),
    }
}

fn describe_save(summary: &SaveSummary) -> String {
    let action = if summary.created { "Created" } else { "Updated" };
    let mut lines = vec![format!(
        "{} {action} {} ({} columns)",
        "✓".green().bold(),
        summary.entity.to_string().yellow(),
        summary.columns
    )];
    for links in &summary.links {
        if links.is_noop() {
            lines.push(format!("  {}: {}", links.property.bold(), "unchanged".dimmed()));
        } else {
            lines.push(format!(
                "  {}: {} {}",
                links.property.bold(),
                format!("+{}", links.inserted.len()).green(),
                format!("-{}", links.deleted.len()).red()
            ));
        }
    }
    lines.join("\n")
}
