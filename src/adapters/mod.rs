// Adapters layer: concrete HTTP implementations of the domain ports.

pub mod nominatim;
pub mod osrm;

pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmRouter;
