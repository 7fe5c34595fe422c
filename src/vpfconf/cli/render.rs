//! Terminal output for the CLI.
//!
//! Property output is never colored: it is meant to be redirected into a
//! properties file or piped into another tool.

use colored::Colorize;
use unicode_width::UnicodeWidthStr;
use vpfconf::api::{CmdMessage, MessageLevel};
use vpfconf::catalog::FeatureCatalog;
use vpfconf::config::VpfConfConfig;
use vpfconf::error::Result;
use vpfconf::model::SelectedFeature;
use vpfconf::properties::{to_json, to_lines, PropertyBag};

const INDENT: &str = "  ";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn pad_to(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

pub(super) fn render_tree(catalog: &FeatureCatalog) -> String {
    let mut out = String::new();
    for lib in catalog.libraries() {
        let tiled = if lib.tiled { " tiled" } else { "" };
        out.push_str(&format!(
            "{} {}\n",
            lib.name.bold(),
            format!("({}{})", lib.path.display(), tiled).dimmed()
        ));

        for cov in &lib.coverages {
            let name_width = cov.features.iter().map(|f| f.name.width()).max().unwrap_or(0);
            out.push_str(&format!("{}{}  {}\n", INDENT, cov.name.cyan(), cov.description));
            for feature in &cov.features {
                out.push_str(&format!(
                    "{}{}{}  {}\n",
                    INDENT,
                    INDENT,
                    pad_to(&feature.name, name_width),
                    feature
                ));
            }
        }
    }
    out
}

pub(super) fn render_selection(selected: &[SelectedFeature]) -> String {
    let name_width = selected
        .iter()
        .map(|s| s.feature.name.width())
        .max()
        .unwrap_or(0);
    selected
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{:>3}. {}  {} [{}]\n",
                i + 1,
                pad_to(&s.feature.name, name_width),
                s.feature,
                s.feature.coverage
            )
        })
        .collect()
}

pub(super) fn render_properties(
    bag: &PropertyBag,
    marker: Option<&str>,
    json: bool,
) -> Result<String> {
    if json {
        return Ok(format!("{}\n", to_json(bag)?));
    }
    let mut out = String::new();
    for line in to_lines(bag, marker) {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub(super) fn render_config(config: &VpfConfConfig) -> String {
    let entries = config.entries();
    let key_width = entries.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    entries
        .into_iter()
        .map(|(k, v)| format!("{} = {}\n", pad_to(k, key_width), v))
        .collect()
}
