//! Initial schema for all three database kinds.

use crate::change::{Change, ChangeSet};
use crate::error::CatalogError;
use crate::kind::DatabaseKind;

pub(super) fn changeset() -> Result<ChangeSet, CatalogError> {
    Ok(ChangeSet::new(
        1,
        vec![
            Change::new([
                "CREATE TABLE metadata_data_sources (\
                    source TEXT NOT NULL, \
                    version TEXT NOT NULL, \
                    timestamp TEXT NOT NULL)",
                "CREATE TABLE name_types (name TEXT NOT NULL, description TEXT NULL)",
                "CREATE UNIQUE INDEX name_types_name ON name_types (name)",
                "CREATE TABLE names (\
                    name TEXT NOT NULL, \
                    identified_object_mrid TEXT NOT NULL, \
                    name_type_name TEXT NOT NULL)",
                "CREATE UNIQUE INDEX names_identified_object_mrid_name_type_name_name \
                    ON names (identified_object_mrid, name_type_name, name)",
                "CREATE INDEX names_identified_object_mrid ON names (identified_object_mrid)",
                "CREATE INDEX names_name ON names (name)",
                "CREATE INDEX names_name_type_name ON names (name_type_name)",
                "CREATE TABLE locations (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL)",
                "CREATE UNIQUE INDEX locations_mrid ON locations (mrid)",
                "CREATE INDEX locations_name ON locations (name)",
                "CREATE TABLE location_street_addresses (\
                    location_mrid TEXT NOT NULL, \
                    address_field TEXT NOT NULL, \
                    town_name TEXT NULL, \
                    state_or_province TEXT NULL, \
                    postal_code TEXT NOT NULL, \
                    street_name TEXT NULL, \
                    number TEXT NULL)",
                "CREATE UNIQUE INDEX location_street_addresses_location_mrid_address_field \
                    ON location_street_addresses (location_mrid, address_field)",
                "CREATE INDEX location_street_addresses_location_mrid \
                    ON location_street_addresses (location_mrid)",
            ]),
            Change::new([
                "CREATE TABLE feeders (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    location_mrid TEXT NULL, \
                    normal_head_terminal_mrid TEXT NULL, \
                    normal_energizing_substation_mrid TEXT NULL)",
                "CREATE UNIQUE INDEX feeders_mrid ON feeders (mrid)",
                "CREATE INDEX feeders_name ON feeders (name)",
                "CREATE TABLE energy_consumers (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    location_mrid TEXT NULL, \
                    customer_count INTEGER NULL, \
                    grounded BOOLEAN NOT NULL, \
                    p NUMBER NULL, \
                    q NUMBER NULL, \
                    phase_connection TEXT NOT NULL)",
                "CREATE UNIQUE INDEX energy_consumers_mrid ON energy_consumers (mrid)",
                "CREATE INDEX energy_consumers_name ON energy_consumers (name)",
                "CREATE TABLE ac_line_segments (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    location_mrid TEXT NULL, \
                    length NUMBER NULL, \
                    per_length_sequence_impedance_mrid TEXT NULL)",
                "CREATE UNIQUE INDEX ac_line_segments_mrid ON ac_line_segments (mrid)",
                "CREATE INDEX ac_line_segments_name ON ac_line_segments (name)",
                "CREATE TABLE power_transformer_ends (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    end_number INTEGER NOT NULL, \
                    power_transformer_mrid TEXT NULL, \
                    connection_kind TEXT NOT NULL, \
                    rated_s INTEGER NULL, \
                    rated_u INTEGER NULL)",
                "CREATE UNIQUE INDEX power_transformer_ends_mrid ON power_transformer_ends (mrid)",
                "CREATE INDEX power_transformer_ends_name ON power_transformer_ends (name)",
                "CREATE UNIQUE INDEX power_transformer_ends_power_transformer_mrid_end_number \
                    ON power_transformer_ends (power_transformer_mrid, end_number)",
                "CREATE INDEX power_transformer_ends_power_transformer_mrid \
                    ON power_transformer_ends (power_transformer_mrid)",
                "CREATE TABLE battery_units (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    location_mrid TEXT NULL, \
                    power_electronics_connection_mrid TEXT NULL, \
                    max_p INTEGER NULL, \
                    min_p INTEGER NULL, \
                    battery_state TEXT NOT NULL, \
                    rated_e NUMBER NULL, \
                    stored_e NUMBER NULL)",
                "CREATE UNIQUE INDEX battery_units_mrid ON battery_units (mrid)",
                "CREATE INDEX battery_units_name ON battery_units (name)",
                "CREATE INDEX battery_units_power_electronics_connection_mrid \
                    ON battery_units (power_electronics_connection_mrid)",
            ])
            .only(&[DatabaseKind::NetworkModel]),
            Change::new([
                "CREATE TABLE customers (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    organisation_mrid TEXT NULL, \
                    kind TEXT NOT NULL, \
                    num_end_devices INTEGER NOT NULL)",
                "CREATE UNIQUE INDEX customers_mrid ON customers (mrid)",
                "CREATE INDEX customers_name ON customers (name)",
                "CREATE INDEX customers_organisation_mrid ON customers (organisation_mrid)",
                "CREATE TABLE customer_agreements (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    customer_mrid TEXT NULL)",
                "CREATE UNIQUE INDEX customer_agreements_mrid ON customer_agreements (mrid)",
                "CREATE INDEX customer_agreements_name ON customer_agreements (name)",
                "CREATE INDEX customer_agreements_customer_mrid ON customer_agreements (customer_mrid)",
                "CREATE TABLE pricing_structures (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL)",
                "CREATE UNIQUE INDEX pricing_structures_mrid ON pricing_structures (mrid)",
                "CREATE INDEX pricing_structures_name ON pricing_structures (name)",
                "CREATE TABLE tariffs (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL)",
                "CREATE UNIQUE INDEX tariffs_mrid ON tariffs (mrid)",
                "CREATE INDEX tariffs_name ON tariffs (name)",
            ])
            .only(&[DatabaseKind::Customer]),
            Change::new([
                "CREATE TABLE diagrams (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    diagram_style TEXT NOT NULL, \
                    orientation_kind TEXT NOT NULL)",
                "CREATE UNIQUE INDEX diagrams_mrid ON diagrams (mrid)",
                "CREATE INDEX diagrams_name ON diagrams (name)",
                "CREATE TABLE diagram_objects (\
                    mrid TEXT NOT NULL, \
                    name TEXT NOT NULL, \
                    description TEXT NOT NULL, \
                    num_diagram_objects INTEGER NOT NULL, \
                    identified_object_mrid TEXT NULL, \
                    diagram_mrid TEXT NULL, \
                    style TEXT NULL, \
                    rotation NUMBER NOT NULL)",
                "CREATE UNIQUE INDEX diagram_objects_mrid ON diagram_objects (mrid)",
                "CREATE INDEX diagram_objects_name ON diagram_objects (name)",
                "CREATE INDEX diagram_objects_identified_object_mrid \
                    ON diagram_objects (identified_object_mrid)",
                "CREATE INDEX diagram_objects_diagram_mrid ON diagram_objects (diagram_mrid)",
                "CREATE TABLE diagram_object_points (\
                    diagram_object_mrid TEXT NOT NULL, \
                    sequence_number INTEGER NOT NULL, \
                    x_position NUMBER NULL, \
                    y_position NUMBER NULL)",
                "CREATE UNIQUE INDEX diagram_object_points_diagram_object_mrid_sequence_number \
                    ON diagram_object_points (diagram_object_mrid, sequence_number)",
                "CREATE INDEX diagram_object_points_diagram_object_mrid \
                    ON diagram_object_points (diagram_object_mrid)",
            ])
            .only(&[DatabaseKind::Diagram]),
        ],
    ))
}
