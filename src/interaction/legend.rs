use indexmap::IndexSet;
use tracing::trace;

use crate::api::{Legend, LegendKind};

/// Visible categories of one legend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    known: IndexSet<String>,
    visible: IndexSet<String>,
}

impl CategorySelection {
    #[must_use]
    pub fn is_visible(&self, category: &str) -> bool {
        self.visible.contains(category)
    }

    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(String::as_str)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.known
            .iter()
            .filter(|c| !self.visible.contains(*c))
            .map(String::as_str)
    }

    fn toggle(mut self, category: &str) -> Self {
        if !self.known.contains(category) {
            return self;
        }
        if !self.visible.shift_remove(category) {
            self.visible.insert(category.to_owned());
        }
        self
    }

    /// Keeps the choice for categories that survive, shows new ones and
    /// forgets the vanished.
    fn sync(mut self, categories: &[String]) -> Self {
        let incoming: IndexSet<&str> = categories.iter().map(String::as_str).collect();
        self.known.retain(|c| incoming.contains(c.as_str()));
        self.visible.retain(|c| incoming.contains(c.as_str()));
        for category in categories {
            if self.known.insert(category.clone()) {
                self.visible.insert(category.clone());
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegendEvent {
    /// A legend entry was clicked.
    Toggle { kind: LegendKind, category: String },
    /// A new view model arrived with these categories.
    Sync {
        kind: LegendKind,
        categories: Vec<String>,
    },
}

/// Category filter state of both legends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegendSelection {
    error: CategorySelection,
    control: CategorySelection,
}

impl LegendSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; toggles of unknown categories change nothing.
    #[must_use]
    pub fn reduce(self, event: &LegendEvent) -> Self {
        trace!(?event, "legend event");
        match event {
            LegendEvent::Toggle { kind, category } => self.map(*kind, |s| s.toggle(category)),
            LegendEvent::Sync { kind, categories } => self.map(*kind, |s| s.sync(categories)),
        }
    }

    fn map(mut self, kind: LegendKind, f: impl FnOnce(CategorySelection) -> CategorySelection) -> Self {
        match kind {
            LegendKind::Error => self.error = f(self.error),
            LegendKind::Control => self.control = f(self.control),
        }
        self
    }

    #[must_use]
    pub fn categories(&self, kind: LegendKind) -> &CategorySelection {
        match kind {
            LegendKind::Error => &self.error,
            LegendKind::Control => &self.control,
        }
    }

    #[must_use]
    pub fn is_visible(&self, kind: LegendKind, category: &str) -> bool {
        self.categories(kind).is_visible(category)
    }

    /// Opacity of the elements tagged with `category`.
    #[must_use]
    pub fn opacity(&self, kind: LegendKind, category: &str, unselected_opacity: f64) -> f64 {
        if self.is_visible(kind, category) {
            1.0
        } else {
            unselected_opacity
        }
    }

    /// Whether a dependent plot draws its point at `x`.
    ///
    /// Each present legend must have a visible category at `x`; an absent
    /// legend does not filter.
    #[must_use]
    pub fn dependent_point_visible(
        &self,
        error_legend: Option<&Legend>,
        control_legend: Option<&Legend>,
        x: f64,
    ) -> bool {
        let passes = |legend: Option<&Legend>, selection: &CategorySelection| {
            legend.is_none_or(|legend| {
                legend
                    .category_at(x)
                    .is_some_and(|category| selection.is_visible(category))
            })
        };
        passes(error_legend, &self.error) && passes(control_legend, &self.control)
    }
}
