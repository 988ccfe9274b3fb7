//! Parsing of user-typed coordinates. Only syntax is checked here; range and
//! NaN checks happen in the route coordinator.

use shared::domain::Coordinate;

pub fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{raw}'"))?;
    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid latitude '{}': {err}", lat.trim()))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid longitude '{}': {err}", lon.trim()))?;
    Ok(Coordinate::new(latitude, longitude))
}

/// `LAT,LON LAT,LON` (origin then destination).
pub fn parse_route_line(line: &str) -> Result<(Coordinate, Coordinate), String> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(origin), Some(destination), None) => {
            Ok((parse_coordinate(origin)?, parse_coordinate(destination)?))
        }
        _ => Err(format!(
            "expected 'ORIGIN_LAT,ORIGIN_LON DEST_LAT,DEST_LON' but got '{}'",
            line.trim()
        )),
    }
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
