use clap::ValueEnum;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use trakt_feed_models::{DisplayRecord, NormalizedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "✓".green(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let json = json!({
                    "type": "success",
                    "message": msg.as_ref()
                });
                self.print_json(&json);
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", "✗".red(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let json = json!({
                    "type": "error",
                    "message": msg.as_ref()
                });
                self.print_json(&json);
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{}", msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let json = json!({
                    "type": "info",
                    "message": msg.as_ref()
                });
                self.print_json(&json);
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "⚠".yellow(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let json = json!({
                    "type": "warning",
                    "message": msg.as_ref()
                });
                self.print_json(&json);
            }
        }
    }

    /// Decorative text; dropped entirely in JSON modes so stdout stays parseable
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet || self.format != OutputFormat::Human {
            return;
        }
        println!("{}", msg.as_ref());
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }

        self.print_json(data);
    }

    /// Print a page of items as a table, or as the host-facing JSON array
    pub fn items(&self, items: &[NormalizedItem]) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                if items.is_empty() {
                    println!("{}", "No items".bright_black());
                    return;
                }
                println!("{}", items_table(items));
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&serde_json::to_value(items).unwrap_or_default());
            }
        }
    }

    pub fn records(&self, records: &[DisplayRecord]) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                for record in records {
                    println!("{}", record.title.bold().bright_cyan());
                    println!("  {}", record.body);
                    if let Some(url) = &record.url {
                        println!("  {}", url.underline());
                    }
                    println!();
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&serde_json::to_value(records).unwrap_or_default());
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }
}

fn items_table(items: &[NormalizedItem]) -> Table {
    let with_kind = items.iter().any(|item| item.media_kind.is_some());
    let with_title = items.iter().any(|item| item.title.is_some());

    let mut header = vec![
        Cell::new("#").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Scheme").add_attribute(comfy_table::Attribute::Bold),
    ];
    if with_kind {
        header.push(Cell::new("Kind").add_attribute(comfy_table::Attribute::Bold));
    }
    if with_title {
        header.push(Cell::new("Title").add_attribute(comfy_table::Attribute::Bold));
    }

    let mut table = Table::new();
    table.set_header(header);
    for (idx, item) in items.iter().enumerate() {
        let mut row = vec![
            Cell::new(idx + 1),
            Cell::new(&item.external_id).fg(comfy_table::Color::Cyan),
            Cell::new(item.id_scheme.as_str()),
        ];
        if with_kind {
            row.push(Cell::new(item.media_kind.map(|k| k.as_str()).unwrap_or("-")));
        }
        if with_title {
            row.push(Cell::new(item.title.as_deref().unwrap_or("")));
        }
        table.add_row(row);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use trakt_feed_models::{IdScheme, MediaKind};

    #[test]
    fn test_items_table_columns_follow_content() {
        let items = vec![
            NormalizedItem::new("tt0816692", IdScheme::Imdb).with_media_kind(MediaKind::Movie),
            NormalizedItem::new("tt0903747", IdScheme::Imdb).with_media_kind(MediaKind::Tv),
        ];
        let rendered = items_table(&items).to_string();
        assert!(rendered.contains("tt0816692"));
        assert!(rendered.contains("Kind"));
        assert!(!rendered.contains("Title"));

        let titled = vec![NormalizedItem::new("157336", IdScheme::Tmdb).with_title("Interstellar")];
        let rendered = items_table(&titled).to_string();
        assert!(rendered.contains("Interstellar"));
        assert!(rendered.contains("tmdb"));
        assert!(!rendered.contains("Kind"));
    }
}
