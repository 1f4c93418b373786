//! Text artifacts produced from a computed spectrum.

use crate::domain::{AtmospecError, ComputeResult};
use crate::spectrum::{BroadenedSpectrum, BroadeningKernel};
use crate::units::EnergyUnit;
use std::fs;
use std::path::Path;

/// Intensity unit of every synthesized cross section.
pub const INTENSITY_UNIT: &str = "cm² per molecule";

const TSV_DELIMITER: char = '\t';

/// Scientific notation with at most `precision` digits after the point,
/// trailing zeros trimmed and a signed, two-digit exponent (`1.235e-05`,
/// `2.5e+01`, `1.e+00`).
pub fn format_scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return non_finite_label(value).to_string();
    }

    let raw = format!("{value:.precision$e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0')
    } else {
        mantissa
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.to_string()
    } else {
        format!("{mantissa}.")
    };
    format!("{mantissa}e{}", signed_exponent(exponent))
}

/// Shortest round-trip representation using the same layout as the plotting
/// front end: positional for moderate magnitudes (always with a fractional
/// part), exponent form below 1e-4 and from 1e16 upwards.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return non_finite_label(value).to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1.0e-4..1.0e16).contains(&magnitude) {
        let raw = format!("{value:e}");
        let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
        return format!("{mantissa}e{}", signed_exponent(exponent));
    }

    let positional = format!("{value}");
    if positional.contains('.') {
        positional
    } else {
        format!("{positional}.0")
    }
}

/// Header line of the spectrum export, without the trailing newline.
pub fn tsv_header(unit: EnergyUnit, kernel: BroadeningKernel, width_ev: f64) -> String {
    let fields = [
        format!("Energy ({unit})"),
        format!("Intensity / {INTENSITY_UNIT}"),
        format!("{kernel} broadening, width = {} eV", format_float(width_ev)),
    ];
    format!("# {}", fields.join(&TSV_DELIMITER.to_string()))
}

/// Tab-separated `(energy, cross section)` export of a spectrum.
pub fn render_tsv(spectrum: &BroadenedSpectrum, kernel: BroadeningKernel, width_ev: f64) -> String {
    let mut output = tsv_header(spectrum.unit, kernel, width_ev);
    output.push('\n');
    for (x, y) in spectrum.x.iter().zip(&spectrum.y) {
        output.push_str(&format_float(*x));
        output.push(TSV_DELIMITER);
        output.push_str(&format_float(*y));
        output.push('\n');
    }
    output
}

pub fn write_tsv(
    path: &Path,
    spectrum: &BroadenedSpectrum,
    kernel: BroadeningKernel,
    width_ev: f64,
) -> ComputeResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| {
            AtmospecError::io_system(
                "IO.EXPORT_DIRECTORY",
                format!("failed to create export directory '{}': {error}", parent.display()),
            )
        })?;
    }
    fs::write(path, render_tsv(spectrum, kernel, width_ev)).map_err(|error| {
        AtmospecError::io_system(
            "IO.EXPORT_WRITE",
            format!("failed to write spectrum export '{}': {error}", path.display()),
        )
    })
}

/// `spectrum_<identifier>.tsv`, or `spectrum.tsv` when no identifier is known.
pub fn export_file_name(identifier: Option<&str>) -> String {
    match identifier.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("spectrum_{id}.tsv"),
        None => "spectrum.tsv".to_string(),
    }
}

fn signed_exponent(exponent: &str) -> String {
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{sign}{digits:0>2}")
}

fn non_finite_label(value: f64) -> &'static str {
    if value.is_nan() {
        "nan"
    } else if value > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}
