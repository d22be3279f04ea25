//! The fixed body catalog: gravitational parameters, physical data, and
//! J2000 mean orbital elements for the Sun and the eight planets.

use std::fmt;
use std::sync::OnceLock;

use orbit_core::constants::MU_SUN;
use serde::{Deserialize, Serialize};

/// Identity of a catalog body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BodyId {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl BodyId {
    /// Every catalog body, Sun first.
    pub const ALL: [BodyId; 9] = [
        BodyId::Sun,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Earth,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
    ];

    /// Lowercase key used on the wire and in journal files.
    pub fn key(self) -> &'static str {
        match self {
            BodyId::Sun => "sun",
            BodyId::Mercury => "mercury",
            BodyId::Venus => "venus",
            BodyId::Earth => "earth",
            BodyId::Mars => "mars",
            BodyId::Jupiter => "jupiter",
            BodyId::Saturn => "saturn",
            BodyId::Uranus => "uranus",
            BodyId::Neptune => "neptune",
        }
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classical orbital elements at epoch J, SI units and radians.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalElements {
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub ascending_node_rad: f64,
    pub arg_periapsis_rad: f64,
    pub mean_anomaly_epoch_rad: f64,
}

/// A catalog body: physical data plus mean elements (absent for the Sun).
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub name: &'static str,
    pub mu_m3_s2: f64,
    pub radius_m: f64,
    pub mass_kg: f64,
    /// Display color carried through to observers.
    pub color: &'static str,
    pub elements: Option<OrbitalElements>,
}

impl Body {
    /// Mean motion n = √(μ_sun/a³) in rad/s; `None` for the Sun.
    pub fn mean_motion_rad_s(&self) -> Option<f64> {
        self.elements
            .as_ref()
            .map(|el| (MU_SUN / el.semi_major_axis_m.powi(3)).sqrt())
    }

    /// Orbital period 2π/n in seconds; `None` for the Sun.
    pub fn orbital_period_s(&self) -> Option<f64> {
        self.mean_motion_rad_s()
            .map(|n| std::f64::consts::TAU / n)
    }

    /// Orbital period in days, the unit reported to observers.
    pub fn orbital_period_days(&self) -> Option<f64> {
        self.orbital_period_s()
            .map(orbit_core::time::seconds_to_days)
    }
}

/// Raw mean-element row as tabulated (au / degrees), converted on first use.
///
/// Values are the JPL approximate elements at J2000.0: semi-major axis,
/// eccentricity, inclination, mean longitude L, longitude of perihelion ϖ,
/// and longitude of ascending node Ω. ω = ϖ − Ω and M₀ = L − ϖ are derived.
struct ElementRow {
    a_au: f64,
    e: f64,
    i_deg: f64,
    mean_longitude_deg: f64,
    perihelion_longitude_deg: f64,
    node_deg: f64,
}

impl ElementRow {
    fn build(&self) -> OrbitalElements {
        let tau = std::f64::consts::TAU;
        OrbitalElements {
            semi_major_axis_m: orbit_core::units::au_to_m(self.a_au),
            eccentricity: self.e,
            inclination_rad: self.i_deg.to_radians(),
            ascending_node_rad: self.node_deg.to_radians().rem_euclid(tau),
            arg_periapsis_rad: (self.perihelion_longitude_deg - self.node_deg)
                .to_radians()
                .rem_euclid(tau),
            mean_anomaly_epoch_rad: (self.mean_longitude_deg - self.perihelion_longitude_deg)
                .to_radians()
                .rem_euclid(tau),
        }
    }
}

/// Full catalog, built once and immutable for the process lifetime.
pub fn catalog() -> &'static [Body; 9] {
    static CATALOG: OnceLock<[Body; 9]> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Look up a catalog body by id.
pub fn get_body(id: BodyId) -> &'static Body {
    let index = BodyId::ALL
        .iter()
        .position(|candidate| *candidate == id)
        .unwrap_or(0);
    &catalog()[index]
}

fn build_catalog() -> [Body; 9] {
    [
        Body {
            id: BodyId::Sun,
            name: "Sun",
            mu_m3_s2: MU_SUN,
            radius_m: 6.957e8,
            mass_kg: 1.989e30,
            color: "#FDB813",
            elements: None,
        },
        Body {
            id: BodyId::Mercury,
            name: "Mercury",
            mu_m3_s2: 2.203_2e13,
            radius_m: 2.439_7e6,
            mass_kg: 3.301e23,
            color: "#8C7853",
            elements: Some(
                ElementRow {
                    a_au: 0.387_099_27,
                    e: 0.205_635_93,
                    i_deg: 7.004_979_02,
                    mean_longitude_deg: 252.250_323_50,
                    perihelion_longitude_deg: 77.457_796_28,
                    node_deg: 48.330_765_93,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Venus,
            name: "Venus",
            mu_m3_s2: 3.248_59e14,
            radius_m: 6.051_8e6,
            mass_kg: 4.867e24,
            color: "#FFC649",
            elements: Some(
                ElementRow {
                    a_au: 0.723_335_66,
                    e: 0.006_776_72,
                    i_deg: 3.394_676_05,
                    mean_longitude_deg: 181.979_099_50,
                    perihelion_longitude_deg: 131.602_467_18,
                    node_deg: 76.679_842_55,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Earth,
            name: "Earth",
            mu_m3_s2: 3.986_004_418e14,
            radius_m: 6.378_1e6,
            mass_kg: 5.972e24,
            color: "#4B7BEC",
            elements: Some(
                ElementRow {
                    a_au: 1.000_002_61,
                    e: 0.016_711_23,
                    i_deg: -0.000_015_31,
                    mean_longitude_deg: 100.464_571_66,
                    perihelion_longitude_deg: 102.937_681_93,
                    node_deg: 0.0,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Mars,
            name: "Mars",
            mu_m3_s2: 4.282_837e13,
            radius_m: 3.396_2e6,
            mass_kg: 6.417e23,
            color: "#CD5C5C",
            elements: Some(
                ElementRow {
                    a_au: 1.523_710_34,
                    e: 0.093_394_10,
                    i_deg: 1.849_691_42,
                    mean_longitude_deg: -4.553_432_05,
                    perihelion_longitude_deg: -23.943_629_59,
                    node_deg: 49.559_538_91,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Jupiter,
            name: "Jupiter",
            mu_m3_s2: 1.266_865_34e17,
            radius_m: 7.149_2e7,
            mass_kg: 1.898e27,
            color: "#DAA520",
            elements: Some(
                ElementRow {
                    a_au: 5.202_887_00,
                    e: 0.048_386_24,
                    i_deg: 1.304_396_95,
                    mean_longitude_deg: 34.396_440_51,
                    perihelion_longitude_deg: 14.728_479_83,
                    node_deg: 100.473_909_09,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Saturn,
            name: "Saturn",
            mu_m3_s2: 3.793_118_7e16,
            radius_m: 6.026_8e7,
            mass_kg: 5.683e26,
            color: "#F4E99B",
            elements: Some(
                ElementRow {
                    a_au: 9.536_675_94,
                    e: 0.053_861_79,
                    i_deg: 2.485_991_87,
                    mean_longitude_deg: 49.954_244_23,
                    perihelion_longitude_deg: 92.598_878_31,
                    node_deg: 113.662_424_48,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Uranus,
            name: "Uranus",
            mu_m3_s2: 5.793_939e15,
            radius_m: 2.555_9e7,
            mass_kg: 8.681e25,
            color: "#4FD0E0",
            elements: Some(
                ElementRow {
                    a_au: 19.189_164_64,
                    e: 0.047_257_44,
                    i_deg: 0.772_637_83,
                    mean_longitude_deg: 313.238_104_51,
                    perihelion_longitude_deg: 170.954_276_30,
                    node_deg: 74.016_925_03,
                }
                .build(),
            ),
        },
        Body {
            id: BodyId::Neptune,
            name: "Neptune",
            mu_m3_s2: 6.836_529e15,
            radius_m: 2.476_4e7,
            mass_kg: 1.024e26,
            color: "#4169E1",
            elements: Some(
                ElementRow {
                    a_au: 30.069_922_76,
                    e: 0.008_590_48,
                    i_deg: 1.770_043_47,
                    mean_longitude_deg: 304.879_970_31,
                    perihelion_longitude_deg: 44.964_762_27,
                    node_deg: 131.784_225_74,
                }
                .build(),
            ),
        },
    ]
}
