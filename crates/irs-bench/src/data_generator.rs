use ndarray::Array3;

/// Tissue classes of the phantom. Label 0 is background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tissue {
    Csf,
    GrayMatter,
    WhiteMatter,
}

impl Tissue {
    pub const ALL: [Tissue; 3] = [Tissue::Csf, Tissue::GrayMatter, Tissue::WhiteMatter];

    pub fn label(self) -> u8 {
        match self {
            Tissue::Csf => 1,
            Tissue::GrayMatter => 2,
            Tissue::WhiteMatter => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tissue::Csf => "CSF",
            Tissue::GrayMatter => "GM",
            Tissue::WhiteMatter => "WM",
        }
    }

    /// Normalized intensity before any scanner distortion.
    fn base_intensity(self) -> f64 {
        match self {
            Tissue::Csf => 0.2,
            Tissue::GrayMatter => 0.5,
            Tissue::WhiteMatter => 0.8,
        }
    }
}

/// Monotone intensity response of one acquisition: `offset + gain * t^gamma`.
#[derive(Debug, Clone)]
pub struct ScannerProfile {
    pub name: String,
    pub gain: f64,
    pub offset: f64,
    pub gamma: f64,
    pub seed: u64,
}

impl ScannerProfile {
    pub fn new(name: &str, gain: f64, offset: f64, gamma: f64, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            gain,
            offset,
            gamma,
            seed,
        }
    }

    fn respond(&self, t: f64) -> f64 {
        self.offset + self.gain * t.powf(self.gamma)
    }
}

/// One rendered acquisition of the phantom.
#[derive(Debug, Clone)]
pub struct Scan {
    pub scanner: String,
    pub image: Array3<f64>,
    /// Foreground (any tissue).
    pub mask: Array3<bool>,
    pub labels: Array3<u8>,
}

/// A set of scans of the same phantom; the first `training_scans` are used to
/// learn the standard scale.
#[derive(Debug, Clone)]
pub struct ScannerFixture {
    pub name: String,
    pub scans: Vec<Scan>,
    pub training_scans: usize,
}

const PHANTOM_SIZE: usize = 24;
const NOISE_AMPLITUDE: f64 = 0.04;

/// Generate all standard evaluation fixtures.
pub fn generate_all_fixtures() -> Vec<ScannerFixture> {
    vec![affine_scanners(), gamma_scanners(), mixed_scanners()]
}

/// Nested spherical shells: CSF core, gray matter, white matter rim.
pub fn phantom_labels() -> Array3<u8> {
    let center = (PHANTOM_SIZE as f64 - 1.0) / 2.0;
    Array3::from_shape_fn((PHANTOM_SIZE, PHANTOM_SIZE, PHANTOM_SIZE), |(x, y, z)| {
        let r = ((x as f64 - center).powi(2)
            + (y as f64 - center).powi(2)
            + (z as f64 - center).powi(2))
        .sqrt();
        if r < 5.0 {
            Tissue::Csf.label()
        } else if r < 8.0 {
            Tissue::GrayMatter.label()
        } else if r < 11.0 {
            Tissue::WhiteMatter.label()
        } else {
            0
        }
    })
}

/// Render the phantom through `profile`. Noise is added in tissue space, so
/// the distortion stays monotone.
pub fn render(labels: &Array3<u8>, profile: &ScannerProfile) -> Scan {
    let mut noise = noise(profile.seed, labels.len(), NOISE_AMPLITUDE).into_iter();
    let image = labels.map(|&label| {
        let n = noise.next().unwrap_or(0.0);
        let t = match Tissue::ALL.iter().find(|t| t.label() == label) {
            Some(tissue) => tissue.base_intensity() + n,
            None => 0.02 + n.abs() / 4.0,
        };
        profile.respond(t)
    });

    Scan {
        scanner: profile.name.clone(),
        image,
        mask: labels.mapv(|l| l > 0),
        labels: labels.clone(),
    }
}

fn fixture(name: &str, profiles: &[ScannerProfile], training_scans: usize) -> ScannerFixture {
    let labels = phantom_labels();
    ScannerFixture {
        name: name.to_string(),
        scans: profiles.iter().map(|p| render(&labels, p)).collect(),
        training_scans,
    }
}

/// Deterministic pseudo-random: simple LCG-based noise in [-amplitude, amplitude].
fn noise(seed: u64, n: usize, amplitude: f64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let frac = ((state >> 33) as f64) / (u32::MAX as f64);
            (frac * 2.0 - 1.0) * amplitude
        })
        .collect()
}

pub fn affine_scanners() -> ScannerFixture {
    let profiles = [
        ScannerProfile::new("siemens_a", 1000.0, 50.0, 1.0, 11),
        ScannerProfile::new("ge_a", 3200.0, 0.0, 1.0, 12),
        ScannerProfile::new("philips_a", 450.0, 120.0, 1.0, 13),
        ScannerProfile::new("siemens_b", 1800.0, 10.0, 1.0, 14),
        ScannerProfile::new("ge_b", 700.0, 300.0, 1.0, 15),
        ScannerProfile::new("philips_b", 2500.0, 80.0, 1.0, 16),
    ];
    fixture("affine_scanners", &profiles, 3)
}

pub fn gamma_scanners() -> ScannerFixture {
    let profiles = [
        ScannerProfile::new("flat", 1000.0, 0.0, 0.7, 21),
        ScannerProfile::new("linear", 1000.0, 0.0, 1.0, 22),
        ScannerProfile::new("steep", 1000.0, 0.0, 1.5, 23),
        ScannerProfile::new("flatter", 1000.0, 0.0, 0.6, 24),
        ScannerProfile::new("steeper", 1000.0, 0.0, 1.8, 25),
    ];
    fixture("gamma_scanners", &profiles, 3)
}

pub fn mixed_scanners() -> ScannerFixture {
    let profiles = [
        ScannerProfile::new("site_1", 1200.0, 40.0, 0.8, 31),
        ScannerProfile::new("site_2", 4000.0, 0.0, 1.3, 32),
        ScannerProfile::new("site_3", 300.0, 200.0, 1.0, 33),
        ScannerProfile::new("site_4", 2200.0, 15.0, 1.6, 34),
        ScannerProfile::new("site_5", 800.0, 90.0, 0.65, 35),
        ScannerProfile::new("site_6", 1500.0, 0.0, 1.2, 36),
    ];
    fixture("mixed_scanners", &profiles, 4)
}
