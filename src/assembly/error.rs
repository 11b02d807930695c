use crate::raster::error::RasterError;
use crate::raster::stack::StackError;
use crate::types::descriptor::{list_failures, TileFailure};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("{} tiles could not be opened: {}", .0.len(), list_failures(.0))]
    UnopenableTiles(Vec<TileFailure>),

    #[error("No tile dated {0} overlaps the requested extent")]
    NoCoverage(NaiveDate),

    #[error("Failed to prepare tile {tile_id} dated {date}")]
    Tile {
        date: NaiveDate,
        tile_id: String,
        #[source]
        source: RasterError,
    },

    #[error("Tiles cannot be laid out on a common grid")]
    Grid(#[source] RasterError),

    #[error("Failed to mosaic the tiles dated {date}")]
    Mosaic {
        date: NaiveDate,
        #[source]
        source: RasterError,
    },

    #[error(transparent)]
    Stack(#[from] StackError),
}
