/// A flight designator such as `AA123`: a two-letter airline code followed
/// by the flight number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightDesignator {
    pub airline_code: String,
    pub flight_number: i32,
}

impl FlightDesignator {
    /// Parse a search query as a designator. Letters are case-insensitive and
    /// the code is normalized to upper case. Surrounding whitespace is ignored.
    pub fn parse(query: &str) -> Option<Self> {
        let query = query.trim();
        let (code, number) = query.split_at_checked(2)?;

        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            airline_code: code.to_ascii_uppercase(),
            flight_number: number.parse().ok()?,
        })
    }
}
