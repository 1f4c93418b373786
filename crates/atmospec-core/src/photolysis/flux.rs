use crate::domain::{AtmospecError, ComputeResult};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Zero-based columns of the reference table holding wavelength and the
/// low, medium, and high flux curves.
const FLUX_COLUMNS: [usize; 4] = [2, 3, 4, 5];

static GLOBAL_FLUX_TABLE: OnceLock<LoadedFluxTable> = OnceLock::new();

struct LoadedFluxTable {
    path: PathBuf,
    table: ActinicFluxTable,
}

impl LoadedFluxTable {
    fn reuse_for(&self, requested: &Path) -> &ActinicFluxTable {
        if requested != self.path.as_path() {
            tracing::debug!(
                requested = %requested.display(),
                loaded = %self.path.display(),
                "actinic flux table already loaded, ignoring requested path"
            );
        }
        &self.table
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluxLevel {
    Low,
    Medium,
    #[default]
    High,
}

impl FluxLevel {
    pub const ALL: [FluxLevel; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low flux",
            Self::Medium => "Medium flux",
            Self::High => "High flux",
        }
    }
}

impl Display for FluxLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for FluxLevel {
    type Err = AtmospecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                AtmospecError::input_validation(
                    "INPUT.FLUX_LEVEL",
                    format!("invalid actinic flux level '{normalized}'"),
                )
            })
    }
}

/// Tabulated solar actinic flux (quanta cm^-2 s^-1 nm^-1) on an ascending
/// wavelength grid in nm.
#[derive(Debug, Clone, PartialEq)]
pub struct ActinicFluxTable {
    wavelengths: Vec<f64>,
    low: Vec<f64>,
    medium: Vec<f64>,
    high: Vec<f64>,
}

impl ActinicFluxTable {
    pub fn new(
        wavelengths: Vec<f64>,
        low: Vec<f64>,
        medium: Vec<f64>,
        high: Vec<f64>,
    ) -> ComputeResult<Self> {
        let len = wavelengths.len();
        if len < 2 {
            return Err(AtmospecError::input_validation(
                "INPUT.FLUX_TABLE",
                format!("actinic flux table needs at least 2 rows, got {len}"),
            ));
        }
        if [low.len(), medium.len(), high.len()].iter().any(|n| *n != len) {
            return Err(AtmospecError::input_validation(
                "INPUT.FLUX_TABLE",
                "actinic flux columns have different lengths",
            ));
        }
        if let Some(index) = wavelengths
            .windows(2)
            .position(|pair| !pair[0].is_finite() || !pair[1].is_finite() || pair[1] <= pair[0])
        {
            return Err(AtmospecError::input_validation(
                "INPUT.FLUX_TABLE",
                format!(
                    "actinic flux wavelengths must be finite and strictly ascending near row {}",
                    index + 1
                ),
            ));
        }
        Ok(Self {
            wavelengths,
            low,
            medium,
            high,
        })
    }

    /// Parses the comma-separated reference table: the first line is a
    /// header, `#` lines are comments, and columns 2..=5 of every other row
    /// are wavelength, low, medium, high.
    pub fn from_csv_str(source: &str) -> ComputeResult<Self> {
        // The first physical line is always the header, even when it starts
        // with the comment character.
        let body = source.split_once('\n').map_or("", |(_, rest)| rest);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut columns: [Vec<f64>; 4] = Default::default();
        for record in reader.records() {
            let record = record.map_err(|error| {
                AtmospecError::input_validation(
                    "INPUT.FLUX_TABLE",
                    format!("malformed actinic flux table: {error}"),
                )
            })?;
            let line = record.position().map_or(0, |position| position.line()) + 1;
            if record.iter().all(str::is_empty) {
                continue;
            }

            for (column, field_index) in columns.iter_mut().zip(FLUX_COLUMNS) {
                let raw = record.get(field_index).ok_or_else(|| {
                    AtmospecError::input_validation(
                        "INPUT.FLUX_TABLE",
                        format!(
                            "line {line}: expected at least {} columns, got {}",
                            FLUX_COLUMNS[3] + 1,
                            record.len()
                        ),
                    )
                })?;
                let value = raw.parse::<f64>().map_err(|error| {
                    AtmospecError::input_validation(
                        "INPUT.FLUX_TABLE",
                        format!(
                            "line {line}, column {}: invalid number '{raw}': {error}",
                            field_index + 1
                        ),
                    )
                })?;
                column.push(value);
            }
        }

        let [wavelengths, low, medium, high] = columns;
        Self::new(wavelengths, low, medium, high)
    }

    pub fn from_path(path: &Path) -> ComputeResult<Self> {
        let source = fs::read_to_string(path).map_err(|error| {
            AtmospecError::io_system(
                "IO.FLUX_TABLE",
                format!(
                    "failed to read actinic flux table '{}': {error}",
                    path.display()
                ),
            )
        })?;
        let table = Self::from_csv_str(&source)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            "loaded actinic flux table"
        );
        Ok(table)
    }

    /// Process-wide table, read from `path` on first use.
    ///
    /// Later calls return the cached table; a different `path` is logged and
    /// otherwise ignored.
    pub fn global(path: &Path) -> ComputeResult<&'static ActinicFluxTable> {
        if let Some(loaded) = GLOBAL_FLUX_TABLE.get() {
            return Ok(loaded.reuse_for(path));
        }
        let table = Self::from_path(path)?;
        let loaded = GLOBAL_FLUX_TABLE.get_or_init(|| LoadedFluxTable {
            path: path.to_path_buf(),
            table,
        });
        Ok(loaded.reuse_for(path))
    }

    /// Path the process-wide table was read from, once loaded.
    pub fn global_path() -> Option<&'static Path> {
        GLOBAL_FLUX_TABLE.get().map(|loaded| loaded.path.as_path())
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn flux(&self, level: FluxLevel) -> &[f64] {
        match level {
            FluxLevel::Low => &self.low,
            FluxLevel::Medium => &self.medium,
            FluxLevel::High => &self.high,
        }
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn wavelength_span(&self) -> (f64, f64) {
        (self.wavelengths[0], self.wavelengths[self.wavelengths.len() - 1])
    }
}
