//! Charts module - declarative chart specs and their rendering

mod plotter;
mod spec;

pub use plotter::ChartPlotter;
pub use spec::{
    BarChartSpec, BarSpec, ColumnDatum, ColumnLayer, DeckSpec, GeoJsonLayer, Layer, RegionShape,
    Tooltip, ViewState, MAP_STYLE, VIEW_HALF_SPAN,
};
