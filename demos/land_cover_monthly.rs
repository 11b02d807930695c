use rasterharvest::{BucketRule, FetchOptions, HarvestConfig, Harvester, Reducer, SpatialExtent, TimeRange};
use std::error::Error;
use std::path::PathBuf;

/// Downloads NDVI tiles for a small area around Utrecht and averages them
/// per month, then reads the 2021 land cover of the same area.
fn main() -> Result<(), Box<dyn Error>> {
    let config = HarvestConfig::builder()
        .max_attempts(5)
        .download_dir(PathBuf::from("tiles"))
        .build();
    let harvester = Harvester::with_config(config)?;
    let utrecht = SpatialExtent::new(5.0, 52.0, 5.2, 52.15)?;

    let ndvi = harvester
        .modis()
        .area(utrecht)
        .variable("250m_16_days_NDVI")
        .time_range(TimeRange::new("2023-01", "2023-12")?)
        .options(
            FetchOptions::builder()
                .agg_level(BucketRule::Month)
                .agg_reducer(Reducer::Max)
                .download(true)
                .clean_dir(true)
                .build(),
        )
        .call()?
        .into_stack()
        .ok_or("expected a raster stack")?;
    for frame in ndvi.frames() {
        println!("{}: {} valid cells", frame.date, frame.raster.valid_cells());
    }

    let land_cover = harvester
        .land_cover()
        .area(utrecht)
        .time_range(TimeRange::new("2021", "2021")?)
        .call()?
        .into_stack()
        .ok_or("expected a raster stack")?;
    println!("Land cover releases: {:?}", land_cover.dates());
    Ok(())
}
