//! The four travel datasets, loaded once at startup.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};
use wisata_core::config::DatasetConfig;
use wisata_core::text::title_case;

use crate::error::DataError;
use crate::table::Table;

/// Column holding the transport mode in the transport dataset.
pub const MODE_COLUMN: &str = "mode";

/// Which of the four datasets a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Transport,
    Promo,
    Destination,
    Hotel,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Transport,
        DatasetKind::Promo,
        DatasetKind::Destination,
        DatasetKind::Hotel,
    ];

    /// Human-readable label, used as the prefix of retrieval documents.
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Transport => "Transport Schedule",
            DatasetKind::Promo => "Promo Travel",
            DatasetKind::Destination => "Destination Info",
            DatasetKind::Hotel => "Hotel Availability",
        }
    }

    /// The free-text city column of this dataset.
    pub fn city_column(&self) -> &'static str {
        match self {
            DatasetKind::Transport => "destination",
            _ => "location",
        }
    }
}

/// A loaded dataset: its kind plus the validated table.
#[derive(Debug, Clone)]
pub struct Dataset {
    kind: DatasetKind,
    table: Table,
}

impl Dataset {
    /// Wrap a table, checking that it carries the kind's city column.
    pub fn from_table(kind: DatasetKind, table: Table) -> Result<Self, DataError> {
        if !table.has_column(kind.city_column()) {
            return Err(DataError::MissingColumn {
                dataset: kind.label().to_string(),
                column: kind.city_column().to_string(),
            });
        }
        Ok(Self { kind, table })
    }

    /// Parse CSV (first record is the header) from any reader.
    pub fn from_reader<R: Read>(kind: DatasetKind, reader: R) -> Result<Self, DataError> {
        let csv_err = |e: csv::Error| DataError::Csv {
            dataset: kind.label().to_string(),
            message: e.to_string(),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(csv_err)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::from_table(kind, Table::new(columns, rows))
    }

    /// Load a dataset from a CSV file on disk.
    pub fn from_path(kind: DatasetKind, path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::from_reader(kind, file)?;
        debug!(
            dataset = kind.label(),
            rows = dataset.table.len(),
            path = %path.display(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn city_column(&self) -> &'static str {
        self.kind.city_column()
    }

    /// Distinct city names in first-seen order.
    pub fn cities(&self) -> Vec<String> {
        self.table.unique_values(self.city_column())
    }

    /// Rows whose city cell contains `needle`, ignoring case.
    pub fn by_city_contains(&self, needle: &str) -> Table {
        self.table.filter_contains(self.city_column(), needle)
    }

    /// Rows whose city cell equals `city`, ignoring case.
    pub fn by_city_equals(&self, city: &str) -> Table {
        self.table.filter_equals(self.city_column(), city)
    }
}

/// Transport and hotel rows for one city. Either side may be absent.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    pub location: String,
    pub transport: Option<Table>,
    pub hotel: Option<Table>,
}

impl Bundle {
    pub fn is_empty(&self) -> bool {
        self.transport.is_none() && self.hotel.is_none()
    }
}

/// One transport mode with the destinations it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeDestinations {
    pub mode: String,
    pub destinations: Vec<String>,
}

/// All four datasets.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub transport: Dataset,
    pub promo: Dataset,
    pub destination: Dataset,
    pub hotel: Dataset,
}

impl Catalog {
    /// Load every dataset from the configured paths.
    pub fn load(config: &DatasetConfig) -> Result<Self, DataError> {
        let catalog = Self {
            transport: Dataset::from_path(
                DatasetKind::Transport,
                Path::new(&config.transport_path),
            )?,
            promo: Dataset::from_path(DatasetKind::Promo, Path::new(&config.promo_path))?,
            destination: Dataset::from_path(
                DatasetKind::Destination,
                Path::new(&config.destination_path),
            )?,
            hotel: Dataset::from_path(DatasetKind::Hotel, Path::new(&config.hotel_path))?,
        };
        info!(
            transport = catalog.transport.table().len(),
            promo = catalog.promo.table().len(),
            destination = catalog.destination.table().len(),
            hotel = catalog.hotel.table().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn get(&self, kind: DatasetKind) -> &Dataset {
        match kind {
            DatasetKind::Transport => &self.transport,
            DatasetKind::Promo => &self.promo,
            DatasetKind::Destination => &self.destination,
            DatasetKind::Hotel => &self.hotel,
        }
    }

    /// Whether the transport dataset carries a mode column.
    pub fn has_modes(&self) -> bool {
        self.transport.table().has_column(MODE_COLUMN)
    }

    /// Distinct transport modes in first-seen order.
    pub fn modes(&self) -> Vec<String> {
        self.transport.table().unique_values(MODE_COLUMN)
    }

    /// Transport rows by destination substring and hotel rows by location
    /// substring for the same city; empty sides are `None`.
    pub fn recommendation_bundle(&self, location: &str) -> Bundle {
        let non_empty = |t: Table| if t.is_empty() { None } else { Some(t) };
        Bundle {
            location: title_case(location),
            transport: non_empty(self.transport.by_city_contains(location)),
            hotel: non_empty(self.hotel.by_city_contains(location)),
        }
    }

    /// Every transport mode (sorted) with its sorted distinct destinations.
    ///
    /// `None` if the transport dataset has no mode column.
    pub fn modes_by_destination(&self) -> Option<Vec<ModeDestinations>> {
        let table = self.transport.table();
        let mode_idx = table.column_index(MODE_COLUMN)?;
        let dest_idx = table.column_index(self.transport.city_column())?;

        let mut grouped: std::collections::BTreeMap<String, Vec<String>> =
            std::collections::BTreeMap::new();
        for row in &table.rows {
            let (Some(mode), Some(dest)) = (row.get(mode_idx), row.get(dest_idx)) else {
                continue;
            };
            grouped.entry(mode.clone()).or_default().push(dest.clone());
        }

        Some(
            grouped
                .into_iter()
                .map(|(mode, mut destinations)| {
                    destinations.sort();
                    destinations.dedup();
                    ModeDestinations { mode, destinations }
                })
                .collect(),
        )
    }

    /// One text document per row of every dataset, in the form
    /// `"<Label>: col: val, col: val"`.
    pub fn documents(&self) -> Vec<String> {
        let mut docs = Vec::new();
        for kind in DatasetKind::ALL {
            let table = self.get(kind).table();
            for record in table.records() {
                let fields = record
                    .iter()
                    .map(|(c, v)| format!("{c}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                docs.push(format!("{}: {}", kind.label(), fields));
            }
        }
        docs
    }
}
