//! Geotag field parsing.

/// A parsed `"lat,lon,zoom"` geotag declaration.
///
/// No range validation is performed on coordinates or zoom; the map
/// frontend owns presentation concerns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTagInput {
    pub lat: f64,
    pub lon: f64,
    pub zoom: i64,
}

impl GeoTagInput {
    /// Parse three comma-separated numeric fields: latitude, longitude,
    /// integer zoom.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let mut parts = s.split(',');
        let (Some(lat), Some(lon), Some(zoom), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(crate::Error::InvalidGeoTag(format!(
                "expected lat,lon,zoom, got: {s}"
            )));
        };

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| crate::Error::InvalidGeoTag(format!("bad latitude: {lat}")))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| crate::Error::InvalidGeoTag(format!("bad longitude: {lon}")))?;
        let zoom: i64 = zoom
            .trim()
            .parse()
            .map_err(|_| crate::Error::InvalidGeoTag(format!("bad zoom: {zoom}")))?;

        Ok(Self { lat, lon, zoom })
    }
}
