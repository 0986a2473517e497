use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Blank space above the plot reserved for the title.
pub const TITLE_BAND_PX: f64 = 40.0;
/// Height reserved for a horizontal legend.
pub const LEGEND_BAND_PX: f64 = 30.0;
/// Width reserved for a vertical legend on the left or right.
pub const LEGEND_SIDE_BAND_PX: f64 = 140.0;
/// Height reserved below the plot for the zoom slider.
pub const DATA_ZOOM_BAND_PX: f64 = 40.0;
/// Minimum vertical grid inset.
pub const EDGE_PADDING_PX: f64 = 20.0;
/// Minimum horizontal grid inset.
pub const SIDE_INSET_PX: f64 = 40.0;

/// Position value in the renderer's box model: pixels or a keyword such as
/// `"center"`, `"middle"` or `"10%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Px(f64),
    Keyword(String),
}

impl Offset {
    #[must_use]
    pub fn keyword(value: impl Into<String>) -> Self {
        Self::Keyword(value.into())
    }

    #[must_use]
    pub fn as_px(&self) -> Option<f64> {
        match self {
            Self::Px(value) => Some(*value),
            Self::Keyword(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSpec {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Offset>,
}

impl TitleSpec {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subtext: None,
            show: true,
            left: Some(Offset::keyword("center")),
            top: Some(Offset::Px(0.0)),
        }
    }

    /// Whether the title occupies vertical space.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.show && !self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    Axis,
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipSpec {
    pub trigger: TooltipTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl LegendPosition {
    #[must_use]
    pub fn is_horizontal_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendOrient {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendSpec {
    pub show: bool,
    pub orient: LegendOrient,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Offset>,
}

impl LegendSpec {
    /// Horizontal legend centered along the bottom edge.
    #[must_use]
    pub fn bottom(data: Vec<String>) -> Self {
        Self {
            show: true,
            orient: LegendOrient::Horizontal,
            data,
            top: None,
            bottom: Some(Offset::Px(0.0)),
            left: Some(Offset::keyword("center")),
            right: None,
        }
    }

    /// Edge the legend is anchored to.
    ///
    /// A vertical legend prefers its horizontal anchor; a horizontal one its
    /// vertical anchor. Keyword anchors (`center`, `middle`) do not count.
    #[must_use]
    pub fn position(&self) -> Option<LegendPosition> {
        let anchored = |offset: &Option<Offset>| matches!(offset, Some(Offset::Px(_)));
        let vertical = if anchored(&self.top) {
            Some(LegendPosition::Top)
        } else if anchored(&self.bottom) {
            Some(LegendPosition::Bottom)
        } else {
            None
        };
        let horizontal = if anchored(&self.left) {
            Some(LegendPosition::Left)
        } else if anchored(&self.right) {
            Some(LegendPosition::Right)
        } else {
            None
        };
        match self.orient {
            LegendOrient::Horizontal => vertical.or(horizontal),
            LegendOrient::Vertical => horizontal.or(vertical),
        }
    }
}

/// Plot-area insets in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub contain_label: bool,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            top: EDGE_PADDING_PX,
            bottom: EDGE_PADDING_PX,
            left: SIDE_INSET_PX,
            right: SIDE_INSET_PX,
            contain_label: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Category,
    Value,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLabelSpec {
    pub rotate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpec {
    #[serde(rename = "type")]
    pub kind: AxisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_label: Option<AxisLabelSpec>,
}

impl AxisSpec {
    #[must_use]
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            name: None,
            data: None,
            axis_label: None,
        }
    }

    #[must_use]
    pub fn categories(labels: Vec<String>) -> Self {
        Self {
            data: Some(labels),
            ..Self::new(AxisKind::Category)
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
    Bar,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// One point of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesDatum {
    Value(f64),
    /// `[epoch_ms, value]`.
    TimeValue(i64, f64),
    Named { name: String, value: f64 },
}

impl SeriesDatum {
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            Self::Value(value) | Self::TimeValue(_, value) | Self::Named { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: Vec<SeriesDatum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_style: Option<AreaStyle>,
}

impl SeriesSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SeriesKind, data: Vec<SeriesDatum>) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
            stack: None,
            area_style: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataZoomKind {
    Inside,
    Slider,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataZoomSpec {
    #[serde(rename = "type")]
    pub kind: DataZoomKind,
    pub start: f64,
    pub end: f64,
}

/// Declarative, renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: TitleSpec,
    pub tooltip: TooltipSpec,
    pub legend: LegendSpec,
    pub grid: GridSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<AxisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<AxisSpec>,
    pub series: Vec<SeriesSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_zoom: Option<Vec<DataZoomSpec>>,
}

impl ChartSpec {
    /// Axis-triggered chart with a bottom legend and no series yet.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: TitleSpec::new(title),
            tooltip: TooltipSpec {
                trigger: TooltipTrigger::Axis,
            },
            legend: LegendSpec::bottom(Vec::new()),
            grid: GridSpec::default(),
            x_axis: None,
            y_axis: None,
            series: Vec::new(),
            data_zoom: None,
        }
    }

    #[must_use]
    pub fn has_slider(&self) -> bool {
        self.data_zoom
            .as_ref()
            .is_some_and(|zooms| zooms.iter().any(|zoom| zoom.kind == DataZoomKind::Slider))
    }

    /// Insets needed so title, legend and zoom slider do not overlap the plot.
    #[must_use]
    pub fn required_grid(&self) -> GridSpec {
        let legend_side = if self.legend.show {
            self.legend.position()
        } else {
            None
        };
        let title = if self.title.is_visible() {
            TITLE_BAND_PX
        } else {
            0.0
        };
        let legend_band = |side: LegendPosition, band: f64| {
            if legend_side == Some(side) { band } else { 0.0 }
        };
        let zoom = if self.has_slider() {
            DATA_ZOOM_BAND_PX
        } else {
            0.0
        };

        GridSpec {
            top: EDGE_PADDING_PX + title + legend_band(LegendPosition::Top, LEGEND_BAND_PX),
            bottom: EDGE_PADDING_PX
                + legend_band(LegendPosition::Bottom, LEGEND_BAND_PX)
                + zoom,
            left: SIDE_INSET_PX + legend_band(LegendPosition::Left, LEGEND_SIDE_BAND_PX),
            right: SIDE_INSET_PX + legend_band(LegendPosition::Right, LEGEND_SIDE_BAND_PX),
            contain_label: self.grid.contain_label,
        }
    }

    /// Widens each grid inset to at least [`ChartSpec::required_grid`].
    pub fn fit_grid(&mut self) {
        let required = self.required_grid();
        self.grid.top = self.grid.top.max(required.top);
        self.grid.bottom = self.grid.bottom.max(required.bottom);
        self.grid.left = self.grid.left.max(required.left);
        self.grid.right = self.grid.right.max(required.right);
    }

    /// Structural checks a renderer relies on: finite numbers everywhere and,
    /// on a time axis, every series sampled at the same points.
    pub fn validate(&self) -> ChartResult<()> {
        for series in &self.series {
            if series.data.iter().any(|datum| !datum.value().is_finite()) {
                return Err(ChartError::InvalidData(format!(
                    "series `{}` contains non-finite values",
                    series.name
                )));
            }
        }

        let is_time_chart = self
            .x_axis
            .as_ref()
            .is_some_and(|axis| axis.kind == AxisKind::Time);
        if is_time_chart {
            if let Some(first) = self.series.first() {
                let expected = first.data.len();
                if let Some(mismatch) = self.series.iter().find(|s| s.data.len() != expected) {
                    return Err(ChartError::InvalidData(format!(
                        "series `{}` has {} points, expected {expected}",
                        mismatch.name,
                        mismatch.data.len()
                    )));
                }
            }
        }

        for (name, value) in [
            ("top", self.grid.top),
            ("bottom", self.grid.bottom),
            ("left", self.grid.left),
            ("right", self.grid.right),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "grid `{name}` must be finite and >= 0"
                )));
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}
