use chrono::{DateTime, Utc};

use crate::domain::{HostingSnapshot, PackageInfo, RepositoryId, RepositoryRecord, Statistic};

pub const IMPORTERS_STATISTIC: &str = "Importers";
pub const IMPORTS_STATISTIC: &str = "Imports";

/// Builds the canonical record from both provider results.
///
/// The hosting snapshot is the base record. Package-index facts are applied
/// afterwards and only ever append statistics, so a sparse index page can
/// never blank out hosting data. `populated_at` becomes the record's
/// last-updated time; neither source's own dates are used for it.
pub fn merge_sources(
    id: RepositoryId,
    snapshot: HostingSnapshot,
    package_info: Option<&PackageInfo>,
    populated_at: DateTime<Utc>,
) -> RepositoryRecord {
    let versions = snapshot.versions.to_versions();

    let mut record = RepositoryRecord::new(id, snapshot.description, populated_at)
        .with_license(snapshot.license)
        .with_topics(snapshot.topics)
        .with_statistics(snapshot.statistics)
        .with_versions(versions);

    if let Some(info) = package_info {
        if info.importers > 0 {
            record.push_statistic(Statistic::new(
                IMPORTERS_STATISTIC,
                info.importers,
                info.importers_url(),
            ));
        }
        if info.imports > 0 {
            record.push_statistic(Statistic::new(IMPORTS_STATISTIC, info.imports, info.imports_url()));
        }
    }

    record.derive_current_version();
    record
}
