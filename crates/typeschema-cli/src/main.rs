use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use log::{debug, warn};

use typeschema_core::config::{
    self, CONFIG_FILE_NAME, FunctionCallingConfig, JsonSchemaConfig, ProjectConfig, TargetKind,
};
use typeschema_core::introspect::{GraphFormat, Introspector, SerializedGraphIntrospector};
use typeschema_core::ir::{TypeGraph, TypeNode};
use typeschema_core::schema::JsonSchemaDefinition;
use typeschema_core::transform::{FunctionCallingTransformer, JsonSchemaTransformer};

#[derive(Parser)]
#[command(
    name = "typeschema",
    about = "Generate JSON Schema documents and LLM tool definitions from type graphs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the target configured in .typeschema.yaml
    Generate {
        /// Path to the type graph (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Emit a JSON Schema Draft 2020-12 document
    JsonSchema {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document name ($id), defaults to the root type id
        #[arg(long)]
        root_name: Option<String>,

        /// Use the strict preset: every property required, strict: true
        #[arg(long)]
        strict: bool,

        /// Emit $schema
        #[arg(long)]
        schema_uri: bool,

        /// Attach OpenAPI discriminator objects to polymorphic types
        #[arg(long)]
        discriminator: bool,
    },

    /// Emit a function-calling tool definition
    Function {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tool name, defaults to the root type id
        #[arg(long)]
        name: Option<String>,

        /// Emit strict: false
        #[arg(long)]
        no_strict: bool,
    },

    /// Check a type graph for dangling references
    Validate {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Re-encode a JSON Schema document in canonical form
    Normalize {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize a new typeschema configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input, output } => cmd_generate(input, output),

        Commands::JsonSchema {
            input,
            output,
            root_name,
            strict,
            schema_uri,
            discriminator,
        } => {
            let cfg = try_load_config()?.unwrap_or_default();
            let mut json_schema = if strict {
                JsonSchemaConfig::STRICT
            } else {
                cfg.json_schema
            };
            json_schema.include_schema_uri |= schema_uri;
            json_schema.include_openapi_discriminator |= discriminator;

            let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
            let graph = load_graph(&input)?;
            let root_name = root_name
                .or(cfg.root_name)
                .unwrap_or_else(|| graph.default_root_name());
            let text = render_json_schema(&graph, &root_name, json_schema)?;
            write_output(output.as_deref(), &text)
        }

        Commands::Function {
            input,
            output,
            name,
            no_strict,
        } => {
            let cfg = try_load_config()?.unwrap_or_default();
            let mut function_calling = cfg.function_calling;
            if no_strict {
                function_calling.strict = false;
            }

            let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
            let graph = load_graph(&input)?;
            let name = name
                .or(cfg.root_name)
                .unwrap_or_else(|| graph.default_root_name());
            let text = render_function(&graph, &name, function_calling)?;
            write_output(output.as_deref(), &text)
        }

        Commands::Validate { input } => cmd_validate(input),

        Commands::Normalize { input, output } => cmd_normalize(input, output),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "typeschema", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ProjectConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Read a serialized type graph, picking the format from the extension.
fn load_graph(path: &Path) -> Result<TypeGraph> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");
    let introspector = SerializedGraphIntrospector::new(GraphFormat::from_extension(ext));

    let graph = introspector
        .introspect(&content)
        .with_context(|| format!("failed to load type graph {}", path.display()))?;
    debug!("loaded {} nodes from {}", graph.nodes.len(), path.display());
    Ok(graph)
}

fn render_json_schema(graph: &TypeGraph, root_name: &str, cfg: JsonSchemaConfig) -> Result<String> {
    let doc = JsonSchemaTransformer::new(cfg)
        .transform(graph, root_name)
        .with_context(|| format!("failed to build JSON Schema for '{root_name}'"))?;
    Ok(doc.to_json_string_pretty()?)
}

fn render_function(graph: &TypeGraph, name: &str, cfg: FunctionCallingConfig) -> Result<String> {
    let schema = FunctionCallingTransformer::new(cfg)
        .transform(graph, name)
        .with_context(|| format!("failed to build tool definition '{name}'"))?;
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Write to `output`, or print to stdout when there is none.
fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    let Some(path) = output else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, format!("{text}\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("  wrote {}", path.display());
    Ok(())
}

fn cmd_generate(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output.or_else(|| cfg.output.as_ref().map(PathBuf::from));

    let graph = load_graph(&input)?;
    let root_name = cfg
        .root_name
        .clone()
        .unwrap_or_else(|| graph.default_root_name());

    let text = match cfg.target {
        TargetKind::JsonSchema => render_json_schema(&graph, &root_name, cfg.json_schema)?,
        TargetKind::FunctionCalling => render_function(&graph, &root_name, cfg.function_calling)?,
    };
    write_output(output.as_deref(), &text)
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let graph = load_graph(&input)?;

    let mut objects = 0;
    let mut enums = 0;
    let mut polymorphic = 0;
    let mut other = 0;
    for node in graph.nodes.values() {
        match node {
            TypeNode::Object(_) => objects += 1,
            TypeNode::Enum(_) => enums += 1,
            TypeNode::Polymorphic(_) => polymorphic += 1,
            _ => other += 1,
        }
    }

    eprintln!("Valid type graph: {}", input.display());
    eprintln!("  Root: {}", graph.default_root_name());
    eprintln!("  Objects: {objects}");
    eprintln!("  Enums: {enums}");
    eprintln!("  Polymorphic: {polymorphic}");
    if other > 0 {
        eprintln!("  Other: {other}");
    }

    let referenced = graph.referenced_ids();
    for id in graph.nodes.keys().filter(|id| !referenced.contains(*id)) {
        warn!("type '{id}' is never referenced");
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_normalize(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let content = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let doc = JsonSchemaDefinition::from_json_str(&content)
        .with_context(|| format!("failed to decode schema document {}", input.display()))?;
    debug!("decoded {} $defs from {}", doc.defs.len(), input.display());
    write_output(output.as_deref(), &doc.to_json_string_pretty()?)
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
