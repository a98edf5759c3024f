//! xmlops
//!
//! Command-line front end for the path-addressed XML document editor.

mod config;

use clap::Parser;
use tracing::{debug, info};
use xmlops_document::{Document, FileStore, NodeEditor, XmlEditor};

use crate::config::{CliConfig, Command};

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "xmlops={level},xmlops_document={level},xmlops_serde={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    run(&config)
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    match &config.command {
        Command::Create { file, root } => {
            XmlEditor::create_with(FileStore::new(file), root, &config.create_options())?;
            info!(file = %file.display(), root = %root, "Document created");
        }
        Command::Show { file, path } => {
            let editor = XmlEditor::open(file)?;
            let text = match path {
                Some(path) => {
                    let node = editor
                        .query_single(path)
                        .ok_or_else(|| anyhow::anyhow!("No node matches `{}`", path))?;
                    render(&node.outer_xml(), config.pretty)?
                }
                None if config.pretty => editor.document().to_xml_string()?,
                None => editor.document().root().map(|r| r.outer_xml()).unwrap_or_default(),
            };
            println!("{}", text);
        }
        Command::Children { file, path } => {
            let editor = XmlEditor::open(file)?;
            let children = editor.query_children(path);
            debug!(path = %path, count = children.len(), "Listing children");
            for child in children {
                println!("{}", child.outer_xml());
            }
        }
        Command::Add {
            file,
            parent,
            name,
            inner,
        } => {
            XmlEditor::open(file)?.add_node(parent, name, inner)?;
            info!(parent = %parent, name = %name, "Node added");
        }
        Command::Append {
            file,
            parent,
            fragment,
        } => {
            XmlEditor::open(file)?.add_fragment(parent, fragment)?;
            info!(parent = %parent, "Fragment appended");
        }
        Command::Delete { file, parent, child } => {
            XmlEditor::open(file)?.delete_node(parent, child)?;
            info!(parent = %parent, child = %child, "Node deleted");
        }
        Command::Modify { file, path, inner } => {
            XmlEditor::open(file)?.modify_node(path, inner)?;
            info!(path = %path, "Node modified");
        }
        Command::Replace { file, path, outer } => {
            XmlEditor::open(file)?.replace_node(path, outer)?;
            info!(path = %path, "Node replaced");
        }
    }
    Ok(())
}

/// Re-indents a single element when `pretty` is set.
fn render(outer_xml: &str, pretty: bool) -> anyhow::Result<String> {
    if !pretty {
        return Ok(outer_xml.to_string());
    }
    Ok(Document::parse(outer_xml)?.to_xml_string()?)
}
