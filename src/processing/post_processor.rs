use crate::config::FetchOptions;
use crate::processing::error::ProcessError;
use crate::processing::extraction::PointTable;
use crate::raster::engine::RasterEngine;
use crate::raster::frame::{Bounds, Frame};
use crate::raster::stack::RasterStack;
use crate::types::extent::{LonLat, SpatialQuery};
use log::{debug, info};

/// What a fetch hands back: the frames themselves, or samples of them.
#[derive(Debug, Clone)]
pub enum ExtractionResult {
    Stack(RasterStack),
    Points(PointTable),
}

impl ExtractionResult {
    pub fn into_stack(self) -> Option<RasterStack> {
        match self {
            ExtractionResult::Stack(stack) => Some(stack),
            ExtractionResult::Points(_) => None,
        }
    }

    pub fn into_points(self) -> Option<PointTable> {
        match self {
            ExtractionResult::Points(table) => Some(table),
            ExtractionResult::Stack(_) => None,
        }
    }
}

/// Gap filling, temporal aggregation and extraction of an assembled stack.
pub struct PostProcessor<'a> {
    engine: &'a dyn RasterEngine,
}

impl<'a> PostProcessor<'a> {
    pub fn new(engine: &'a dyn RasterEngine) -> Self {
        Self { engine }
    }

    /// Applies gap filling and then temporal aggregation, as configured.
    pub fn prepare(
        &self,
        stack: RasterStack,
        options: &FetchOptions,
    ) -> Result<RasterStack, ProcessError> {
        let mut frames = stack.into_frames();
        if let Some(window) = options.gapfill_window {
            debug!("Gap filling {} frames with a {}x{} window", frames.len(), window, window);
            frames = frames
                .into_iter()
                .map(|frame| {
                    let raster = self
                        .engine
                        .fill_gaps(&frame.raster, window)
                        .map_err(|source| ProcessError::GapFill {
                            date: frame.date,
                            source,
                        })?;
                    Ok(Frame::new(frame.date, raster))
                })
                .collect::<Result<Vec<_>, ProcessError>>()?;
        }
        if let Some(rule) = &options.agg_level {
            let before = frames.len();
            frames = self
                .engine
                .aggregate_time(&frames, rule, options.agg_reducer)
                .map_err(ProcessError::Aggregation)?;
            info!(
                "Aggregated {} frames into {} by {} ({})",
                before,
                frames.len(),
                rule,
                options.agg_reducer
            );
        }
        Ok(RasterStack::new(frames)?)
    }

    /// Samples every frame at `points`.
    pub fn extract(
        &self,
        stack: &RasterStack,
        points: &[LonLat],
    ) -> Result<PointTable, ProcessError> {
        PointTable::sample_stack(stack, points, |frame| {
            self.engine
                .sample(&frame.raster, points)
                .map_err(|source| ProcessError::Sampling {
                    date: frame.date,
                    source,
                })
        })
    }

    /// Clips every frame to `bounds`.
    pub fn crop(&self, stack: RasterStack, bounds: &Bounds) -> Result<RasterStack, ProcessError> {
        let frames = stack
            .into_frames()
            .into_iter()
            .map(|frame| {
                let raster = self
                    .engine
                    .clip(&frame.raster, bounds)
                    .map_err(|source| ProcessError::Crop {
                        date: frame.date,
                        source,
                    })?;
                Ok(Frame::new(frame.date, raster))
            })
            .collect::<Result<Vec<_>, ProcessError>>()?;
        Ok(RasterStack::new(frames)?)
    }

    /// Prepares the stack, then samples it for point queries or crops it to
    /// the requested area.
    pub fn process(
        &self,
        stack: RasterStack,
        query: &SpatialQuery,
        options: &FetchOptions,
    ) -> Result<ExtractionResult, ProcessError> {
        let stack = self.prepare(stack, options)?;
        match query {
            SpatialQuery::Points(points) => Ok(ExtractionResult::Points(
                self.extract(&stack, points.as_slice())?,
            )),
            SpatialQuery::Area(extent) if options.crop && !stack.is_empty() => Ok(
                ExtractionResult::Stack(self.crop(stack, &Bounds::from(*extent))?),
            ),
            SpatialQuery::Area(_) => Ok(ExtractionResult::Stack(stack)),
        }
    }
}
