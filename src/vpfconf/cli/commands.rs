use super::render::{
    print_messages, render_config, render_properties, render_selection, render_tree,
};
use super::setup::{CatalogArgs, Cli, Commands, OutputArgs, StyleArgs};
use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing::debug;
use vpfconf::api::{ConfigAction, Overrides, VpfConfigApi};
use vpfconf::config::config_dir;
use vpfconf::error::Result;
use vpfconf::logging::init_logging;
use vpfconf::source::vpf::VpfSource;

struct AppContext {
    api: VpfConfigApi<VpfSource>,
    layer_marker: Option<String>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = init_context()?;

    match cli.command {
        Commands::Tree { paths, catalog } => handle_tree(&ctx, paths, catalog),
        Commands::Properties {
            paths,
            features,
            catalog,
            style,
            output,
        } => handle_properties(&ctx, paths, features, catalog, style, output),
        Commands::Session {
            paths,
            catalog,
            style,
            output,
        } => handle_session(&ctx, paths, catalog, style, output),
        Commands::Config { key, value } => handle_config(&ctx, key, value),
    }
}

fn init_context() -> Result<AppContext> {
    let dir = config_dir()?;
    debug!(config_dir = %dir.display(), "using config dir");
    let api = VpfConfigApi::new(VpfSource::new(), dir);
    let layer_marker = api.load_config()?.marker().map(str::to_string);
    Ok(AppContext { api, layer_marker })
}

fn overrides(catalog: &CatalogArgs, style: Option<&StyleArgs>) -> Overrides {
    Overrides {
        show_all: catalog.show_all.then_some(true),
        search_by_feature: catalog.search_by_feature,
        style: style.map(StyleArgs::pairs).unwrap_or_default(),
    }
}

fn marker<'a>(ctx: &'a AppContext, output: &'a OutputArgs) -> Option<&'a str> {
    output
        .marker
        .as_deref()
        .or(ctx.layer_marker.as_deref())
        .filter(|m| !m.is_empty())
}

fn handle_tree(ctx: &AppContext, paths: Vec<PathBuf>, catalog: CatalogArgs) -> Result<()> {
    let result = ctx.api.tree(&paths, &overrides(&catalog, None))?;
    if let Some(catalog) = &result.catalog {
        print!("{}", render_tree(catalog));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_properties(
    ctx: &AppContext,
    paths: Vec<PathBuf>,
    features: Vec<String>,
    catalog: CatalogArgs,
    style: StyleArgs,
    output: OutputArgs,
) -> Result<()> {
    let result = ctx
        .api
        .properties(&paths, &features, &overrides(&catalog, Some(&style)))?;
    for message in &result.messages {
        eprintln!("{}", message.content);
    }
    if let Some(layer) = &result.layer {
        print!(
            "{}",
            render_properties(&layer.properties, marker(ctx, &output), output.json)?
        );
    }
    Ok(())
}

fn handle_session(
    ctx: &AppContext,
    paths: Vec<PathBuf>,
    catalog: CatalogArgs,
    style: StyleArgs,
    output: OutputArgs,
) -> Result<()> {
    let mut session = ctx
        .api
        .session(&paths, &overrides(&catalog, Some(&style)))?;
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let marker = marker(ctx, &output);

    if interactive {
        print!("{}", render_tree(session.catalog()));
        println!("Type 'help' for commands.");
    }

    let mut lines = stdin.lock().lines();
    while !session.is_finished() {
        if interactive {
            print!("vpfconf> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let result = session.execute_line(&line?)?;

        if !result.selection.is_empty() {
            print!("{}", render_selection(&result.selection));
        }
        print_messages(&result.messages);
        if let Some(layer) = &result.layer {
            // An explicit or configured marker wins over the layer name.
            let prefix = marker.or(layer.name.as_deref());
            print!(
                "{}",
                render_properties(&layer.properties, prefix, output.json)?
            );
        }
    }

    debug!(layers = session.handler().len(), "session ended");
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action.clone())?;
    if let (ConfigAction::ShowAll, Some(config)) = (&action, &result.config) {
        print!("{}", render_config(config));
    }
    print_messages(&result.messages);
    Ok(())
}
