use anyhow::Result;

use crate::cli::OutputFormat;
use crate::RepositoryRecord;

use super::super::Container;

pub struct RepositoryController<'a> {
    container: &'a Container,
}

impl<'a> RepositoryController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn get(&self, identifier: String, format: OutputFormat) -> Result<String> {
        let use_case = self.container.get_repository_use_case();
        let record = use_case.execute(&identifier).await?;

        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(&record)?,
            OutputFormat::Text => self.format_record(&record),
        })
    }

    pub async fn exists(&self, identifier: String) -> Result<String> {
        let use_case = self.container.get_repository_use_case();
        let cached = use_case.is_cached(&identifier).await?;

        Ok(if cached {
            format!("{} is stored.", identifier)
        } else {
            format!("{} is not stored.", identifier)
        })
    }

    fn format_record(&self, record: &RepositoryRecord) -> String {
        let mut out = format!("{}\n", record.id());
        out.push_str(&format!(
            "  Description: {}\n",
            record.description().unwrap_or("(none)")
        ));
        out.push_str(&format!(
            "  Updated:     {}\n",
            record.last_updated().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if let Some(license) = record.license() {
            out.push_str(&format!("  License:     {}\n", license.name()));
        }

        let current = record.current_version();
        if !current.is_empty() {
            let published = current
                .published()
                .map(|p| format!(" ({})", p.format("%Y-%m-%d")))
                .unwrap_or_default();
            out.push_str(&format!("  Current:     {}{}\n", current.name(), published));
        }

        if !record.topics().is_empty() {
            let names: Vec<&str> = record.topics().iter().map(|t| t.name()).collect();
            out.push_str(&format!("  Topics:      {}\n", names.join(", ")));
        }

        if !record.statistics().is_empty() {
            out.push_str("\n  Statistics:\n");
            for stat in record.statistics() {
                out.push_str(&format!("    {:<14} {:>8}  {}\n", stat.name(), stat.value(), stat.url()));
            }
        }

        if record.has_versions() {
            out.push_str(&format!("\n  Versions ({}):\n", record.versions().len()));
            for version in record.versions() {
                match version.published() {
                    Some(p) => out.push_str(&format!("    {} ({})\n", version.name(), p.format("%Y-%m-%d"))),
                    None => out.push_str(&format!("    {}\n", version.name())),
                }
            }
        }

        out
    }
}
