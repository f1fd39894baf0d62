use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "weft",
    about = "weft -- render, fill in and save schema-described objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    Edit,
    Output,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the types declared by a schema
    Types(TypesArgs),
    /// Render an object as edit or display markup
    Render(RenderArgs),
    /// Apply a submitted form to an object
    Input(InputArgs),
    /// Save an object, optionally after applying a form
    Save(SaveArgs),
}

/// Options shared by every command that builds a mapper.
#[derive(Args)]
pub struct MapperArgs {
    /// TOML file of `[[types]]` declarations
    #[arg(long)]
    pub schema: PathBuf,
    /// TOML mapper configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// JSON object of `{ "Type": [objects] }` saved before the command runs
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

/// The object a command works on.
#[derive(Args)]
pub struct ObjectArgs {
    #[arg(long = "type")]
    pub type_name: String,
    /// JSON file holding the object; an empty object when omitted
    #[arg(long)]
    pub object: Option<PathBuf>,
}

#[derive(Args)]
pub struct TypesArgs {
    #[arg(long)]
    pub schema: PathBuf,
}

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub mapper: MapperArgs,
    #[command(flatten)]
    pub target: ObjectArgs,
    #[arg(long, default_value = "edit")]
    pub mode: RenderMode,
    /// Wrap every display value in a `<div>`
    #[arg(long)]
    pub mandatory_container: bool,
}

#[derive(Args)]
pub struct InputArgs {
    #[command(flatten)]
    pub mapper: MapperArgs,
    #[command(flatten)]
    pub target: ObjectArgs,
    /// JSON object of submitted form fields
    #[arg(long)]
    pub form: PathBuf,
}

#[derive(Args)]
pub struct SaveArgs {
    #[command(flatten)]
    pub mapper: MapperArgs,
    #[command(flatten)]
    pub target: ObjectArgs,
    #[arg(long)]
    pub form: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_types() {
        let cli = Cli::try_parse_from(["weft", "types", "--schema", "s.toml"]).unwrap();
        if let Command::Types(args) = cli.command {
            assert_eq!(args.schema, PathBuf::from("s.toml"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_render_defaults_to_edit() {
        let cli = Cli::try_parse_from(["weft", "render", "--schema", "s.toml", "--type", "Order"]).unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.mode, RenderMode::Edit);
            assert_eq!(args.target.type_name, "Order");
            assert!(args.target.object.is_none());
            assert!(!args.mandatory_container);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_render_output() {
        let cli = Cli::try_parse_from([
            "weft", "render", "--schema", "s.toml", "--type", "Order",
            "--object", "o.json", "--mode", "output", "--mandatory-container",
        ])
        .unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.mode, RenderMode::Output);
            assert_eq!(args.target.object, Some(PathBuf::from("o.json")));
            assert!(args.mandatory_container);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_input_requires_form() {
        assert!(Cli::try_parse_from(["weft", "input", "--schema", "s.toml", "--type", "Order"]).is_err());
        let cli = Cli::try_parse_from([
            "weft", "input", "--schema", "s.toml", "--type", "Order", "--form", "f.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Input(_)));
    }

    #[test]
    fn parse_save_with_seed_and_config() {
        let cli = Cli::try_parse_from([
            "weft", "save", "--schema", "s.toml", "--config", "c.toml",
            "--seed", "seed.json", "--type", "Order",
        ])
        .unwrap();
        if let Command::Save(args) = cli.command {
            assert_eq!(args.mapper.config, Some(PathBuf::from("c.toml")));
            assert_eq!(args.mapper.seed, Some(PathBuf::from("seed.json")));
            assert!(args.form.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbose_and_json() {
        let cli = Cli::try_parse_from(["weft", "--verbose", "--format", "json", "types", "--schema", "s.toml"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
