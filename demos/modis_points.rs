use rasterharvest::{FetchOptions, Harvester, LonLat, TimeRange};
use std::env;
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    configure_polars_display();
    let harvester = Harvester::new()?;
    let stations = vec![
        LonLat(4.7639, 52.3086),  // Schiphol
        LonLat(5.1806, 52.1017),  // De Bilt
        LonLat(5.8833, 50.9053),  // Maastricht
    ];

    let table = harvester
        .modis()
        .points(stations)
        .variable("LST_Day_1km")
        .time_range(TimeRange::new("2024-07-01", "2024-07-31")?)
        .options(FetchOptions::builder().gapfill_window(3).build())
        .call()?
        .into_points()
        .ok_or("expected a point table")?;

    println!("{}", table.frame);
    table.write_csv(Path::new("lst_july_2024.csv"))?;
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
}
