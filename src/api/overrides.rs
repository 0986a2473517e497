use serde::{Deserialize, Serialize};
use tracing::trace;

use super::chart_spec::{
    AxisLabelSpec, AxisSpec, ChartSpec, GridSpec, LegendOrient, LegendPosition, LegendSpec, Offset,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
}

/// Legend changes. Setting `position`, or any single edge offset, moves the
/// legend to that edge and drops its previous anchors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegendOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<LegendPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<LegendOrient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Offset>,
}

impl LegendOverride {
    #[must_use]
    pub fn at(position: LegendPosition) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    fn offset(&self, side: LegendPosition) -> Option<&Offset> {
        match side {
            LegendPosition::Top => self.top.as_ref(),
            LegendPosition::Bottom => self.bottom.as_ref(),
            LegendPosition::Left => self.left.as_ref(),
            LegendPosition::Right => self.right.as_ref(),
        }
    }

    /// Edge implied by the override: explicit `position`, then pixel anchors,
    /// then any anchor at all.
    fn target_position(&self) -> Option<LegendPosition> {
        if self.position.is_some() {
            return self.position;
        }
        let anchored = LegendSpec {
            show: true,
            orient: self.orient.unwrap_or(LegendOrient::Horizontal),
            data: Vec::new(),
            top: self.top.clone(),
            bottom: self.bottom.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
        };
        anchored.position().or_else(|| {
            [
                LegendPosition::Top,
                LegendPosition::Bottom,
                LegendPosition::Left,
                LegendPosition::Right,
            ]
            .into_iter()
            .find(|side| self.offset(*side).is_some())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AxisOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_rotate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
}

/// User display overrides, one optional section per top-level spec section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<AxisOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<AxisOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridOverride>,
}

impl DisplayOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendOverride) -> Self {
        self.legend = Some(legend);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: TitleOverride) -> Self {
        self.title = Some(title);
        self
    }
}

/// Merges `overrides` into `base`, section by section.
///
/// Moving the legend rebuilds its anchors for the new edge (no stale offset
/// from the previous edge survives) and re-fits the grid: insets still at
/// their computed value follow the new layout, hand-tuned insets only grow.
/// Explicit grid overrides are applied last and always win.
#[must_use]
pub fn apply_overrides(mut base: ChartSpec, overrides: &DisplayOverrides) -> ChartSpec {
    let fitted = base.required_grid();

    if let Some(title) = &overrides.title {
        if let Some(text) = &title.text {
            base.title.text.clone_from(text);
        }
        if title.subtext.is_some() {
            base.title.subtext.clone_from(&title.subtext);
        }
        if let Some(show) = title.show {
            base.title.show = show;
        }
    }

    if let Some(legend) = &overrides.legend {
        apply_legend(&mut base.legend, legend);
    }

    let required = base.required_grid();
    refit_grid(&mut base.grid, fitted, required);

    if let Some(axis) = &overrides.x_axis {
        apply_axis(base.x_axis.as_mut(), axis);
    }
    if let Some(axis) = &overrides.y_axis {
        apply_axis(base.y_axis.as_mut(), axis);
    }

    if let Some(grid) = overrides.grid {
        base.grid.top = grid.top.unwrap_or(base.grid.top);
        base.grid.bottom = grid.bottom.unwrap_or(base.grid.bottom);
        base.grid.left = grid.left.unwrap_or(base.grid.left);
        base.grid.right = grid.right.unwrap_or(base.grid.right);
    }

    trace!(
        legend_position = ?base.legend.position(),
        grid_top = base.grid.top,
        grid_right = base.grid.right,
        "applied display overrides"
    );
    base
}

fn apply_legend(legend: &mut LegendSpec, overrides: &LegendOverride) {
    if let Some(show) = overrides.show {
        legend.show = show;
    }

    // No position and no anchors: only orientation can change.
    let Some(position) = overrides.target_position() else {
        if let Some(orient) = overrides.orient {
            legend.orient = orient;
        }
        return;
    };

    let primary = overrides
        .offset(position)
        .cloned()
        .unwrap_or(Offset::Px(0.0));
    legend.top = None;
    legend.bottom = None;
    legend.left = None;
    legend.right = None;

    if position.is_horizontal_edge() {
        legend.left = Some(
            overrides
                .left
                .clone()
                .unwrap_or_else(|| Offset::keyword("center")),
        );
        legend.orient = overrides.orient.unwrap_or(LegendOrient::Horizontal);
    } else {
        legend.top = Some(
            overrides
                .top
                .clone()
                .unwrap_or_else(|| Offset::keyword("middle")),
        );
        legend.orient = overrides.orient.unwrap_or(LegendOrient::Vertical);
    }

    match position {
        LegendPosition::Top => legend.top = Some(primary),
        LegendPosition::Bottom => legend.bottom = Some(primary),
        LegendPosition::Left => legend.left = Some(primary),
        LegendPosition::Right => legend.right = Some(primary),
    }
}

fn refit_grid(grid: &mut GridSpec, before: GridSpec, after: GridSpec) {
    for (inset, was, needed) in [
        (&mut grid.top, before.top, after.top),
        (&mut grid.bottom, before.bottom, after.bottom),
        (&mut grid.left, before.left, after.left),
        (&mut grid.right, before.right, after.right),
    ] {
        *inset = if *inset == was {
            needed
        } else {
            (*inset).max(needed)
        };
    }
}

fn apply_axis(axis: Option<&mut AxisSpec>, overrides: &AxisOverride) {
    let Some(axis) = axis else {
        return;
    };
    if overrides.name.is_some() {
        axis.name.clone_from(&overrides.name);
    }
    if let Some(rotate) = overrides.label_rotate {
        axis.axis_label = Some(AxisLabelSpec { rotate });
    }
}
