//! Core units, constants, and shared primitives for the Orbit Engine workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Heliocentric gravitational parameter (m³/s²).
    pub const MU_SUN: f64 = 1.327_124_400_18e20;
    /// Metres per astronomical unit.
    pub const AU_M: f64 = 1.495_978_707e11;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Newtonian gravitational constant (m³ kg⁻¹ s⁻²).
    pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::AU_M;

    /// Convert metres to astronomical units.
    #[inline]
    pub fn m_to_au(v: f64) -> f64 {
        v / AU_M
    }

    /// Convert astronomical units to metres.
    #[inline]
    pub fn au_to_m(v: f64) -> f64 {
        v * AU_M
    }

    /// Convert metres per second to kilometres per second.
    #[inline]
    pub fn ms_to_kms(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert m²/s² to km²/s² (specific-energy scale used for C₃).
    #[inline]
    pub fn m2s2_to_km2s2(v: f64) -> f64 {
        v / 1.0e6
    }
}

/// Epoch handling and the ISO-8601 boundary.
///
/// Internally every time is `f64` seconds since epoch J (J2000,
/// 2000-01-01T12:00:00Z). ISO strings appear only at external interfaces and
/// every conversion funnels through this module.
pub mod time {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
    use thiserror::Error;

    use super::constants::SECONDS_PER_DAY;

    /// Error raised for timestamps the boundary cannot interpret.
    #[derive(Debug, Error)]
    pub enum TimeError {
        #[error("invalid timestamp `{value}`")]
        InvalidTimestamp { value: String },
    }

    /// The calendar instant defining simulation t = 0 (J2000).
    pub fn epoch() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Epoch J as an ISO-8601 string, for metadata headers.
    pub fn epoch_iso() -> String {
        format_instant(0.0)
    }

    /// Parse an external ISO-8601 timestamp into seconds since epoch J.
    ///
    /// Accepts RFC 3339 strings as well as the zone-less
    /// `YYYY-MM-DDTHH:MM:SS` and bare-date forms clients commonly send;
    /// zone-less values are interpreted as UTC.
    pub fn parse_instant(value: &str) -> Result<f64, TimeError> {
        let instant = parse_utc(value).ok_or_else(|| TimeError::InvalidTimestamp {
            value: value.to_string(),
        })?;
        let delta = instant.signed_duration_since(epoch());
        Ok(delta
            .num_microseconds()
            .map_or(delta.num_seconds() as f64, |us| us as f64 / 1.0e6))
    }

    /// Format seconds since epoch J as an ISO-8601 UTC string.
    pub fn format_instant(seconds: f64) -> String {
        let micros = (seconds * 1.0e6).round() as i64;
        let instant = epoch() + TimeDelta::microseconds(micros);
        instant.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Format a wall-clock instant as an ISO-8601 UTC string.
    pub fn format_wall(instant: DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Some(naive.and_utc());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
        None
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres or m/s depending on context.
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product of two vectors.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector in the direction of `v`.
    #[inline]
    pub fn unit(v: &Vector3) -> Vector3 {
        scale(v, 1.0 / norm(v))
    }
}
