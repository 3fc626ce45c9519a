//! Compiled-in ChangeSet history shared by all three database kinds.
//!
//! Each ChangeSet lives in its own `vNNN_*.rs` module and is listed in
//! [`CHANGESETS`]. Released modules are frozen: fix mistakes by adding a new
//! ChangeSet, never by editing an old one.

use crate::catalog::ChangeSetCatalog;
use crate::change::ChangeSet;
use crate::error::CatalogError;
use std::sync::OnceLock;

mod v001_initial;
mod v002_commissioned_dates;
mod v003_battery_energy_wh;
mod v004_drop_street_addresses;
mod v005_optional_customer_kind;
mod v006_pricing_links_placeholder;
mod v007_pricing_links;
mod v008_feeder_head_terminal;
mod v009_reference_data;
mod v010_feeder_energizing_substations;
mod v011_diagram_object_style;

type ChangeSetFn = fn() -> Result<ChangeSet, CatalogError>;

/// All known ChangeSets, in order.
static CHANGESETS: &[ChangeSetFn] = &[
    v001_initial::changeset,
    v002_commissioned_dates::changeset,
    v003_battery_energy_wh::changeset,
    v004_drop_street_addresses::changeset,
    v005_optional_customer_kind::changeset,
    v006_pricing_links_placeholder::changeset,
    v007_pricing_links::changeset,
    v008_feeder_head_terminal::changeset,
    v009_reference_data::changeset,
    v010_feeder_energizing_substations::changeset,
    v011_diagram_object_style::changeset,
];

static BUILTIN: OnceLock<Result<ChangeSetCatalog, CatalogError>> = OnceLock::new();

/// Build every compiled-in ChangeSet.
pub fn all() -> Result<Vec<ChangeSet>, CatalogError> {
    CHANGESETS.iter().map(|build| build()).collect()
}

/// The validated compiled-in catalog, built on first use.
pub fn builtin_catalog() -> Result<&'static ChangeSetCatalog, CatalogError> {
    BUILTIN
        .get_or_init(|| all().and_then(ChangeSetCatalog::new))
        .as_ref()
        .map_err(Clone::clone)
}
