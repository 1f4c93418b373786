//! Grid, interpolation, smoothing, and quadrature primitives shared by the
//! spectrum and photolysis stages.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericsError {
    #[error("numeric helpers require at least {required} points, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },
    #[error("input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("grid entry must be finite at index {index}, got {value}")]
    NonFiniteGrid { index: usize, value: f64 },
    #[error("grid must be strictly increasing, index {index} has {current} after {previous}")]
    NonIncreasingGrid {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("invalid grid bounds [{start}, {end}]")]
    InvalidBounds { start: f64, end: f64 },
}

/// `count` evenly spaced values from `start` to `end`, both endpoints included.
pub fn linspace(start: f64, end: f64, count: usize) -> Result<Vec<f64>, NumericsError> {
    if count < 2 {
        return Err(NumericsError::InsufficientPoints {
            required: 2,
            actual: count,
        });
    }
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(NumericsError::InvalidBounds { start, end });
    }

    let step = (end - start) / (count - 1) as f64;
    let mut grid: Vec<f64> = (0..count).map(|index| start + step * index as f64).collect();
    grid[count - 1] = end;
    Ok(grid)
}

/// Linear interpolation of `(x, y)` at each query, returning `0.0` outside
/// `[x[0], x[n-1]]`.
pub fn interpolate_linear_zero_fill(
    queries: &[f64],
    x: &[f64],
    y: &[f64],
) -> Result<Vec<f64>, NumericsError> {
    validate_grid(x, y, 2)?;
    let last = x.len() - 1;

    let values = queries
        .iter()
        .map(|query| {
            let query = *query;
            if !(x[0]..=x[last]).contains(&query) {
                return 0.0;
            }
            match x.binary_search_by(|probe| probe.total_cmp(&query)) {
                Ok(index) => y[index],
                Err(upper) => {
                    let lower = upper - 1;
                    let fraction = (query - x[lower]) / (x[upper] - x[lower]);
                    y[lower] + (y[upper] - y[lower]) * fraction
                }
            }
        })
        .collect();
    Ok(values)
}

/// Trapezoidal-rule integral of `y` over the grid `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> Result<f64, NumericsError> {
    validate_grid(x, y, 2)?;
    Ok(x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum())
}

/// Box-filter smoothing with "same" convolution semantics: the output has the
/// input length and samples beyond either edge count as zero.
pub fn box_smooth_same(values: &[f64], kernel_size: usize) -> Vec<f64> {
    if values.is_empty() || kernel_size <= 1 {
        return values.to_vec();
    }

    let weight = 1.0 / kernel_size as f64;
    let offset = (kernel_size - 1) / 2;
    let len = values.len() as isize;

    (0..len)
        .map(|center| {
            let first = center - offset as isize;
            (first..first + kernel_size as isize)
                .filter(|index| (0..len).contains(index))
                .map(|index| values[index as usize] * weight)
                .sum()
        })
        .collect()
}

pub fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn min_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn validate_grid(x: &[f64], y: &[f64], required: usize) -> Result<(), NumericsError> {
    if x.len() < required {
        return Err(NumericsError::InsufficientPoints {
            required,
            actual: x.len(),
        });
    }
    if x.len() != y.len() {
        return Err(NumericsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    for (index, value) in x.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(NumericsError::NonFiniteGrid { index, value });
        }
        if index > 0 && value <= x[index - 1] {
            return Err(NumericsError::NonIncreasingGrid {
                index,
                previous: x[index - 1],
                current: value,
            });
        }
    }
    Ok(())
}
