use rasterharvest::{Harvester, SpatialExtent};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let harvester = Harvester::new()?;
    let eiger = SpatialExtent::new(7.95, 46.55, 8.05, 46.62)?;

    let stack = harvester
        .dem()
        .area(eiger)
        .call()?
        .into_stack()
        .ok_or("expected a raster stack")?;

    for frame in stack.frames() {
        let raster = &frame.raster;
        let max = raster
            .values()
            .iter()
            .filter(|v| !v.is_nan())
            .fold(f32::MIN, |a, b| a.max(*b));
        println!(
            "{}: {}x{} cells, highest point {:.0} m",
            frame.date,
            raster.width(),
            raster.height(),
            max
        );
    }

    let written = stack.write_geotiffs(Path::new("out"), "eiger_dem")?;
    println!("Wrote {:?}", written);
    Ok(())
}
