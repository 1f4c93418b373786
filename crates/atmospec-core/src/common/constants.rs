//! Physical constants (CODATA 2018) and the fixed unit factors used by the
//! spectrum pipeline.

pub const PI: f64 = std::f64::consts::PI;

/// Reduced Planck constant, J s.
pub const HBAR: f64 = 1.054_571_817e-34;
/// Vacuum permittivity, F m^-1.
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;
/// Speed of light in vacuum, m s^-1.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Hartree energy in eV.
pub const HARTREE_EV: f64 = 27.211_386_245_988;
/// Atomic unit of electric dipole moment, C m.
pub const AU_TO_CM: f64 = 8.478_354e-30;

/// eV to nm conversion numerator, `nm = NM_FACTOR / eV`.
pub const NM_FACTOR: f64 = 1239.8;
/// eV to cm^-1 multiplicative factor.
pub const CM_FACTOR: f64 = 8065.547_937;

/// Converts oscillator strength times a normalized line shape (eV^-1) into
/// an absorption cross section in cm^2 per molecule.
pub const CROSS_SECTION_COEFF: f64 =
    PI * AU_TO_CM * AU_TO_CM * HARTREE_EV * 1.0e4 / (2.0 * HBAR * EPSILON_0 * SPEED_OF_LIGHT);

/// Number of points in every synthesized spectrum.
pub const N_SAMPLE_POINTS: usize = 500;

/// Padding added around the excitation energies, eV.
pub const ENERGY_PADDING_EV: f64 = 1.5;

/// Below this lower bound (eV) the window halves the lowest energy instead.
pub const MIN_PADDED_ENERGY_EV: f64 = 1.0;
