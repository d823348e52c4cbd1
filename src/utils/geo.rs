//! Airport/weather proximity.
//!
//! Distances are planar: the Euclidean norm over raw latitude/longitude
//! degrees, not a great-circle distance. One unit is read as roughly 70 miles,
//! which is where the band labels come from.

/// Events farther than this from an airport are never correlated with it.
pub const WEATHER_JOIN_RADIUS: f64 = 5.0;

/// Planar distance between two coordinates, in coordinate units
pub fn planar_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    ((lat1 - lat2).powi(2) + (lng1 - lng2).powi(2)).sqrt()
}

/// SQL expression for the planar distance between an airport row and a
/// weather event row, given their table aliases.
pub fn planar_distance_sql(airport: &str, event: &str) -> String {
    format!(
        "SQRT(POW({airport}.locationLat - {event}.locationLat, 2) + POW({airport}.locationLng - {event}.locationLng, 2))"
    )
}

/// Ordinal proximity bucket between an airport and a weather event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistanceBand {
    Within70Miles,
    From70To140Miles,
    From140To210Miles,
    Over210Miles,
}

impl DistanceBand {
    pub const ALL: [DistanceBand; 4] = [
        DistanceBand::Within70Miles,
        DistanceBand::From70To140Miles,
        DistanceBand::From140To210Miles,
        DistanceBand::Over210Miles,
    ];

    /// Inclusive upper bound of the band; the last band is open-ended.
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            DistanceBand::Within70Miles => Some(1.0),
            DistanceBand::From70To140Miles => Some(2.0),
            DistanceBand::From140To210Miles => Some(3.0),
            DistanceBand::Over210Miles => None,
        }
    }

    pub fn classify(distance: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|band| band.upper_bound().is_none_or(|bound| distance <= bound))
            .unwrap_or(DistanceBand::Over210Miles)
    }

    pub const fn label(self) -> &'static str {
        match self {
            DistanceBand::Within70Miles => "Within 70 miles",
            DistanceBand::From70To140Miles => "70-140 miles",
            DistanceBand::From140To210Miles => "140-210 miles",
            DistanceBand::Over210Miles => "Over 210 miles",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.label() == label)
    }

    /// SQL `CASE` over `distance_expr` producing the band labels, built from
    /// the same bounds as [`DistanceBand::classify`].
    pub fn sql_case(distance_expr: &str) -> String {
        let mut sql = String::from("CASE");
        for band in Self::ALL {
            match band.upper_bound() {
                Some(bound) => sql.push_str(&format!(
                    " WHEN {distance_expr} <= {bound} THEN '{}'",
                    band.label()
                )),
                None => sql.push_str(&format!(" ELSE '{}'", band.label())),
            }
        }
        sql.push_str(" END");
        sql
    }

    /// Predicate that holds when `distance_expr` falls in this band or a closer one.
    pub fn within_sql(self, distance_expr: &str) -> String {
        match self.upper_bound() {
            Some(bound) => format!("{distance_expr} <= {bound}"),
            None => format!("{distance_expr} <= {WEATHER_JOIN_RADIUS}"),
        }
    }
}
