use serde::Serialize;

/// Departure delays above this many minutes are shown as delayed.
pub const DELAYED_AFTER_MINUTES: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayStatus {
    Cancelled,
    Diverted,
    Delayed,
    #[serde(rename = "On Time")]
    OnTime,
}

impl DisplayStatus {
    pub fn classify(cancelled: bool, diverted: bool, departure_delay: Option<f64>) -> Self {
        if cancelled {
            DisplayStatus::Cancelled
        } else if diverted {
            DisplayStatus::Diverted
        } else if departure_delay.is_some_and(|delay| delay > DELAYED_AFTER_MINUTES) {
            DisplayStatus::Delayed
        } else {
            DisplayStatus::OnTime
        }
    }
}

/// Dominant cause of a delay, checked in a fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DelayReason {
    Weather,
    Carrier,
    #[serde(rename = "Air Traffic")]
    AirTraffic,
    Security,
    #[serde(rename = "Late Aircraft")]
    LateAircraft,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DelayBreakdown {
    pub weather: Option<f64>,
    pub carrier: Option<f64>,
    pub nas: Option<f64>,
    pub security: Option<f64>,
    pub late_aircraft: Option<f64>,
}

impl DelayBreakdown {
    pub fn reason(&self) -> Option<DelayReason> {
        let positive = |minutes: Option<f64>| minutes.is_some_and(|m| m > 0.0);

        [
            (self.weather, DelayReason::Weather),
            (self.carrier, DelayReason::Carrier),
            (self.nas, DelayReason::AirTraffic),
            (self.security, DelayReason::Security),
            (self.late_aircraft, DelayReason::LateAircraft),
        ]
        .into_iter()
        .find(|(minutes, _)| positive(*minutes))
        .map(|(_, reason)| reason)
    }
}
