use geo::Point;
use gpx::{errors::GpxError, write, Gpx, GpxVersion, Route as GpxRoute, Waypoint};
use std::{fs::File, io::Error, path::PathBuf};

use crate::result_writer::ExportRecord;

#[derive(Debug, thiserror::Error)]
pub enum GpxWriterError {
    #[error("Failed to create GPX file: {error}")]
    FileCreateError { error: Error },

    #[error("Failed to write GPX: {error}")]
    WriteError { error: GpxError },
}

/// Writes each record as a two point route between its locations.
pub struct GpxWriter<'a, T: ExportRecord> {
    records: &'a [T],
    file_name: PathBuf,
}

impl<'a, T: ExportRecord> GpxWriter<'a, T> {
    pub fn new(records: &'a [T], file_name: PathBuf) -> Self {
        Self { records, file_name }
    }

    fn build_gpx(&self) -> Gpx {
        let mut gpx = Gpx::default();
        gpx.version = GpxVersion::Gpx11;
        gpx.creator = Some(env!("CARGO_PKG_NAME").to_string());

        for record in self.records {
            let intersection = record.intersection();
            let mut gpx_route = GpxRoute::new();

            let name = format!("{} ⚬ {}", intersection.street1, intersection.street2);
            let mut description = format!("Distance: {:.0}m", intersection.distance);
            if let Some(city) = record.city() {
                description.push_str(&format!("\nCity: {city}"));
            }
            gpx_route.name = Some(name.clone());
            gpx_route.description = Some(description);

            for (idx, location) in [intersection.location1, intersection.location2]
                .into_iter()
                .enumerate()
            {
                let mut waypoint = Waypoint::new(Point::from(location));
                waypoint.name = Some(format!("{name} #{}", idx + 1));
                gpx_route.points.push(waypoint);
            }

            gpx.routes.push(gpx_route);
        }

        gpx
    }

    pub fn write_gpx(self) -> Result<(), GpxWriterError> {
        let gpx = self.build_gpx();

        let file = File::create(&self.file_name)
            .map_err(|error| GpxWriterError::FileCreateError { error })?;

        write(&gpx, file).map_err(|error| GpxWriterError::WriteError { error })?;

        Ok(())
    }
}
