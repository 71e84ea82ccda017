/// Longitude/latitude rectangle in degrees.
///
/// `west > east` means the rectangle crosses the antimeridian. Every other
/// operation here assumes a non-crossing rectangle unless stated otherwise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Degenerate rectangle covering a single position.
    pub fn point(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, lon, lat)
    }

    /// Smallest rectangle covering all positions, `None` when empty.
    pub fn from_positions<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut b = Self::point(first[0], first[1]);
        for [lon, lat] in iter {
            b.west = b.west.min(lon);
            b.south = b.south.min(lat);
            b.east = b.east.max(lon);
            b.north = b.north.max(lat);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.west + self.east) * 0.5,
            (self.south + self.north) * 0.5,
        ]
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Closed-interval overlap test; touching edges intersect.
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds::new(
            self.west.min(other.west),
            self.south.min(other.south),
            self.east.max(other.east),
            self.north.max(other.north),
        )
    }

    /// Splits an antimeridian-crossing rectangle into its eastern and western halves.
    pub fn split_antimeridian(&self) -> (GeoBounds, Option<GeoBounds>) {
        if !self.crosses_antimeridian() {
            return (*self, None);
        }
        (
            GeoBounds::new(self.west, self.south, 180.0, self.north),
            Some(GeoBounds::new(-180.0, self.south, self.east, self.north)),
        )
    }

    /// Rounds every edge to `decimals` fractional digits.
    pub fn rounded(&self, decimals: i32) -> GeoBounds {
        let scale = 10f64.powi(decimals);
        let r = |v: f64| (v * scale).round() / scale;
        GeoBounds::new(r(self.west), r(self.south), r(self.east), r(self.north))
    }
}
