//! Chart editor state: the axis selection and which saved config is being edited.

use rpt_analysis::suggest::DefaultChart;
use rpt_core::chart::DEFAULT_CHART_HEIGHT;
use rpt_core::{Aggregation, ChartConfig, ChartDraft, ChartType, ConfigId, SortDirection};

/// The values in the chart editor form.
///
/// `None` fields are not chosen yet. Suggested defaults only ever fill those.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSelection {
    pub name: String,
    pub chart_type: Option<ChartType>,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub group_by: Option<String>,
    pub aggregation: Aggregation,
    pub sort_direction: SortDirection,
    pub height: u32,
    pub is_default: bool,
}

impl Default for AxisSelection {
    fn default() -> Self {
        Self {
            name: String::new(),
            chart_type: None,
            x_axis: None,
            y_axis: None,
            group_by: None,
            aggregation: Aggregation::Sum,
            sort_direction: SortDirection::Desc,
            height: DEFAULT_CHART_HEIGHT,
            is_default: false,
        }
    }
}

impl AxisSelection {
    /// Pre-fill from a suggested default without touching explicit choices.
    pub fn apply_defaults(&mut self, default: &DefaultChart) {
        if self.chart_type.is_none() {
            self.chart_type = Some(default.chart_type);
        }
        if self.x_axis.is_none() {
            self.x_axis = default.x_axis.clone();
        }
        if self.y_axis.is_none() {
            self.y_axis = default.y_axis.clone();
        }
    }

    /// Load a saved config into the form.
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            name: config.name.clone(),
            chart_type: Some(config.chart_type),
            x_axis: Some(config.x_axis.clone()),
            y_axis: Some(config.y_axis.clone()),
            group_by: config.group_by.clone(),
            aggregation: config.aggregation,
            sort_direction: config.sort_direction,
            height: config.height,
            is_default: config.is_default,
        }
    }

    /// The form as a draft, if both axes are chosen.
    pub fn to_draft(&self) -> Option<ChartDraft> {
        let x = self.x_axis.as_deref().filter(|s| !s.trim().is_empty())?;
        let y = self.y_axis.as_deref().filter(|s| !s.trim().is_empty())?;
        let mut draft = ChartDraft::new(
            self.chart_type.unwrap_or(ChartType::Bar),
            x,
            y,
            self.aggregation,
        );
        draft.name = self.name.clone();
        draft.sort_direction = self.sort_direction;
        draft.group_by = self.group_by.clone();
        draft.height = self.height;
        draft.is_default = self.is_default;
        Some(draft)
    }
}

/// Which saved config, if any, the editor is bound to.
///
/// Set when editing starts and cleared on save or cancel; saving with no id
/// creates a new config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditSession {
    editing: Option<ConfigId>,
}

impl EditSession {
    pub fn begin(&mut self, config_id: ConfigId) {
        self.editing = Some(config_id);
    }

    pub fn editing(&self) -> Option<ConfigId> {
        self.editing
    }

    pub fn clear(&mut self) {
        self.editing = None;
    }
}
