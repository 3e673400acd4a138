//! Measura - bidirectional unit converter
//!
//! `SyncController` owns the converter state: the active category, the
//! selected source and target units, both value fields and the rate line.
//! The presentation layer feeds it `Event`s and mirrors whatever it writes
//! through the `View` trait.

mod state;
mod view;

pub use state::{Event, SyncState, UnitOption};
pub use view::{FieldUpdates, NullView, View};

use measura_core::{format_number, DEFAULT_MAX_DECIMALS};
use measura_units::Registry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Category shown when the converter starts
pub const DEFAULT_CATEGORY: &str = "length";

/// Start-up and display settings
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub default_category: String,
    pub max_decimals: usize,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            max_decimals: DEFAULT_MAX_DECIMALS,
        }
    }

    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    pub fn with_max_decimals(mut self, max_decimals: usize) -> Self {
        self.max_decimals = max_decimals;
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the source and target fields of the converter consistent
pub struct SyncController {
    registry: Arc<Registry>,
    options: SyncOptions,
    state: SyncState,
}

impl SyncController {
    /// Controller over the built-in registry
    pub fn new(options: SyncOptions) -> Self {
        Self::with_registry(Arc::new(Registry::builtin()), options)
    }

    /// Controller over a given registry. The default category is selected
    /// and one forward update runs, as on first page load.
    pub fn with_registry(registry: Arc<Registry>, options: SyncOptions) -> Self {
        let mut controller = Self {
            registry,
            options,
            state: SyncState::default(),
        };
        let category = controller.options.default_category.clone();
        controller.select_category(&category, &mut NullView);
        controller
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Push the complete state to a view, e.g. one that just attached
    pub fn render(&self, view: &mut dyn View) {
        let s = &self.state;
        view.show_units(&s.units);
        view.show_selection(&s.source_unit, &s.target_unit);
        view.show_source_text(&s.source_text);
        view.show_target_text(&s.target_text);
        view.show_rate_text(&s.rate_text);
    }

    /// Apply one user interaction and write the affected fields
    pub fn handle(&mut self, event: Event, view: &mut dyn View) {
        debug!(?event, category = %self.state.category, "handling event");
        match event {
            Event::CategoryChanged(category) => self.select_category(&category, view),
            Event::SourceValueEdited(text) => {
                self.state.source_text = text;
                self.forward_sync(view);
            }
            Event::SourceUnitChanged(unit) => {
                self.state.source_unit = unit;
                self.forward_sync(view);
            }
            Event::TargetValueEdited(text) => {
                self.state.target_text = text;
                self.reverse_then_sync(view);
            }
            Event::TargetUnitChanged(unit) => {
                self.state.target_unit = unit;
                self.forward_sync(view);
            }
            Event::SwapRequested => self.swap(view),
        }
    }

    /// Recompute the target field and the rate line from the source side
    fn forward_sync(&mut self, view: &mut dyn View) {
        let s = &mut self.state;
        let result = self
            .registry
            .try_convert(&s.source_text, &s.source_unit, &s.target_unit, &s.category)
            .ok();

        s.target_text = format_number(result, self.options.max_decimals);
        s.rate_text = self.registry.rate_text(
            &s.source_unit,
            &s.target_unit,
            &s.category,
            self.options.max_decimals,
        );

        view.show_target_text(&s.target_text);
        view.show_rate_text(&s.rate_text);
    }

    /// Write the source field from the target side, then run exactly one
    /// forward pass. The forward pass never leads back here.
    fn reverse_then_sync(&mut self, view: &mut dyn View) {
        let s = &mut self.state;
        let result = self
            .registry
            .try_convert(&s.target_text, &s.target_unit, &s.source_unit, &s.category)
            .ok();

        s.source_text = format_number(result, self.options.max_decimals);
        view.show_source_text(&s.source_text);

        self.forward_sync(view);
    }

    /// Switch category and reset both unit lists to its defaults.
    ///
    /// An unknown category leaves the unit lists as they were; the forward
    /// update still runs and clears whatever no longer converts.
    fn select_category(&mut self, category: &str, view: &mut dyn View) {
        match self.registry.category(category) {
            Some(cat) => {
                let units: Vec<UnitOption> = cat.units().into_iter().map(UnitOption::from).collect();
                let (source, target) = cat.default_selection().unwrap_or(("", ""));

                self.state.units = units;
                self.state.source_unit = source.to_string();
                self.state.target_unit = target.to_string();

                view.show_units(&self.state.units);
                view.show_selection(&self.state.source_unit, &self.state.target_unit);
            }
            None => warn!(category, "unknown category, keeping unit lists"),
        }

        self.state.category = category.to_string();
        self.forward_sync(view);
    }

    /// Exchange units and raw field texts, then reconcile with a forward pass
    fn swap(&mut self, view: &mut dyn View) {
        let s = &mut self.state;
        std::mem::swap(&mut s.source_unit, &mut s.target_unit);
        std::mem::swap(&mut s.source_text, &mut s.target_text);

        view.show_selection(&s.source_unit, &s.target_unit);
        view.show_source_text(&s.source_text);

        self.forward_sync(view);
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use measura_units::{Category, LinearUnit};

    /// Records every write in order
    #[derive(Default)]
    struct CallLog {
        calls: Vec<String>,
    }

    impl CallLog {
        fn count(&self, prefix: &str) -> usize {
            self.calls.iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    impl View for CallLog {
        fn show_units(&mut self, units: &[UnitOption]) {
            self.calls.push(format!("units:{}", units.len()));
        }
        fn show_selection(&mut self, source_unit: &str, target_unit: &str) {
            self.calls.push(format!("selection:{}->{}", source_unit, target_unit));
        }
        fn show_source_text(&mut self, text: &str) {
            self.calls.push(format!("source:{}", text));
        }
        fn show_target_text(&mut self, text: &str) {
            self.calls.push(format!("target:{}", text));
        }
        fn show_rate_text(&mut self, text: &str) {
            self.calls.push(format!("rate:{}", text));
        }
    }

    fn controller() -> SyncController {
        SyncController::default()
    }

    #[test]
    fn test_startup_selects_default_category() {
        let c = controller();
        let s = c.state();
        assert_eq!(s.category, "length");
        assert_eq!(s.source_unit, "meter");
        assert_eq!(s.target_unit, "kilometer");
        assert_eq!(s.units.len(), 8);
        assert_eq!(s.target_text, "");
        assert_eq!(s.rate_text, "1 Meter = 0.001 Kilometer");
    }

    #[test]
    fn test_startup_with_options() {
        let c = SyncController::new(SyncOptions::new().with_default_category("temperature"));
        assert_eq!(c.state().source_unit, "celsius");
        assert_eq!(c.state().target_unit, "fahrenheit");
        assert_eq!(c.state().rate_text, "1 Celsius (°C) = 33.8 Fahrenheit (°F)");
    }

    #[test]
    fn test_forward_update() {
        let mut c = controller();
        let mut view = FieldUpdates::new();
        c.handle(Event::TargetUnitChanged("centimeter".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("2.5".into()), &mut view);

        assert_eq!(view.target_text.as_deref(), Some("250"));
        assert_eq!(view.rate_text.as_deref(), Some("1 Meter = 100 Centimeter"));
        assert_eq!(view.source_text, None);
        assert_eq!(c.state().target_text, "250");
    }

    #[test]
    fn test_unit_change_recomputes() {
        let mut c = controller();
        c.handle(Event::SourceValueEdited("1".into()), &mut NullView);
        c.handle(Event::SourceUnitChanged("kilometer".into()), &mut NullView);
        c.handle(Event::TargetUnitChanged("meter".into()), &mut NullView);
        assert_eq!(c.state().target_text, "1000");
        assert_eq!(c.state().rate_text, "1 Kilometer = 1000 Meter");
    }

    #[test]
    fn test_reverse_update_runs_one_forward_pass() {
        let mut c = controller();
        c.handle(Event::TargetUnitChanged("centimeter".into()), &mut NullView);

        let mut log = CallLog::default();
        c.handle(Event::TargetValueEdited("150".into()), &mut log);

        assert_eq!(log.calls, vec![
            "source:1.5".to_string(),
            "target:150".to_string(),
            "rate:1 Meter = 100 Centimeter".to_string(),
        ]);
        assert_eq!(c.state().source_text, "1.5");
    }

    #[test]
    fn test_reverse_update_with_garbage_clears_both_fields() {
        let mut c = controller();
        c.handle(Event::SourceValueEdited("3".into()), &mut NullView);

        let mut log = CallLog::default();
        c.handle(Event::TargetValueEdited("abc".into()), &mut log);

        assert_eq!(log.count("source:"), 1);
        assert_eq!(log.count("target:"), 1);
        assert_eq!(c.state().source_text, "");
        assert_eq!(c.state().target_text, "");
        // The rate depends only on the units
        assert_eq!(c.state().rate_text, "1 Meter = 0.001 Kilometer");
    }

    #[test]
    fn test_category_switch_resets_units() {
        let mut c = controller();
        let mut view = FieldUpdates::new();
        c.handle(Event::SourceValueEdited("2".into()), &mut NullView);
        c.handle(Event::CategoryChanged("volume".into()), &mut view);

        assert_eq!(c.state().source_unit, "liter");
        assert_eq!(c.state().target_unit, "milliliter");
        assert_eq!(c.state().target_text, "2000");
        assert_eq!(view.source_unit.as_deref(), Some("liter"));
        assert_eq!(view.target_unit.as_deref(), Some("milliliter"));
        let ids: Vec<&str> = view.units.as_ref().unwrap().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids[..2], ["liter", "milliliter"]);
    }

    #[test]
    fn test_unknown_category_keeps_lists_and_clears_output() {
        let mut c = controller();
        c.handle(Event::SourceValueEdited("2".into()), &mut NullView);

        let mut view = FieldUpdates::new();
        c.handle(Event::CategoryChanged("speed".into()), &mut view);

        assert_eq!(view.units, None);
        assert_eq!(c.state().category, "speed");
        assert_eq!(c.state().source_unit, "meter");
        assert_eq!(c.state().target_text, "");
        assert_eq!(c.state().rate_text, "");
    }

    #[test]
    fn test_swap_scenario() {
        let mut c = controller();
        c.handle(Event::TargetUnitChanged("foot".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("10".into()), &mut NullView);
        assert_eq!(c.state().target_text, "32.808399");

        let mut view = FieldUpdates::new();
        c.handle(Event::SwapRequested, &mut view);

        let s = c.state();
        assert_eq!(s.source_unit, "foot");
        assert_eq!(s.source_text, "32.808399");
        assert_eq!(s.target_unit, "meter");
        assert_eq!(s.target_text, "10");
        assert_eq!(s.rate_text, "1 Foot = 0.3048 Meter");
        assert_eq!(view.source_unit.as_deref(), Some("foot"));
        assert_eq!(view.source_text.as_deref(), Some("32.808399"));
        assert_eq!(view.target_text.as_deref(), Some("10"));
    }

    #[test]
    fn test_swap_after_typing_target() {
        let mut c = controller();
        c.handle(Event::TargetUnitChanged("foot".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("10".into()), &mut NullView);
        c.handle(Event::TargetValueEdited("32.8".into()), &mut NullView);

        // Typing the target rewrites the source, then the forward pass
        // normalizes the target text
        assert_eq!(c.state().source_text, "9.99744");
        assert_eq!(c.state().target_text, "32.8");

        let mut log = CallLog::default();
        c.handle(Event::SwapRequested, &mut log);

        let s = c.state();
        assert_eq!(s.source_unit, "foot");
        assert_eq!(s.source_text, "32.8");
        assert_eq!(s.target_unit, "meter");
        assert_eq!(s.target_text, "9.99744");
        assert_eq!(s.rate_text, "1 Foot = 0.3048 Meter");
        assert_eq!(log.calls, vec![
            "selection:foot->meter".to_string(),
            "source:32.8".to_string(),
            "target:9.99744".to_string(),
            "rate:1 Foot = 0.3048 Meter".to_string(),
        ]);
    }

    #[test]
    fn test_swap_reconciles_raw_text() {
        let mut c = controller();
        c.handle(Event::TargetUnitChanged("centimeter".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("1".into()), &mut NullView);
        c.handle(Event::SwapRequested, &mut NullView);

        // Raw target text "100" moved to the source side before recomputing
        assert_eq!(c.state().source_text, "100");
        assert_eq!(c.state().target_text, "1");
    }

    #[test]
    fn test_empty_source_clears_target() {
        let mut c = controller();
        c.handle(Event::SourceValueEdited("5".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("".into()), &mut NullView);
        assert_eq!(c.state().target_text, "");
        // The rate line describes the unit pair, not the typed value
        assert_eq!(c.state().rate_text, "1 Meter = 0.001 Kilometer");

        c.handle(Event::SourceValueEdited("not a number".into()), &mut NullView);
        assert_eq!(c.state().target_text, "");
        assert_eq!(c.state().rate_text, "1 Meter = 0.001 Kilometer");
    }

    #[test]
    fn test_empty_source_with_failing_pair_clears_rate() {
        let mut c = controller();
        c.handle(Event::TargetUnitChanged("furlong".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("".into()), &mut NullView);
        assert_eq!(c.state().target_text, "");
        assert_eq!(c.state().rate_text, "");
    }

    #[test]
    fn test_unknown_unit_clears_rate() {
        let mut c = controller();
        c.handle(Event::SourceValueEdited("5".into()), &mut NullView);
        c.handle(Event::TargetUnitChanged("furlong".into()), &mut NullView);
        assert_eq!(c.state().target_text, "");
        assert_eq!(c.state().rate_text, "");
    }

    #[test]
    fn test_equal_units_rate() {
        let mut c = controller();
        c.handle(Event::SourceValueEdited("7.5".into()), &mut NullView);
        c.handle(Event::TargetUnitChanged("meter".into()), &mut NullView);
        assert_eq!(c.state().target_text, "7.5");
        assert_eq!(c.state().rate_text, "1 Meter = 1 Meter");
    }

    #[test]
    fn test_single_unit_category() {
        let registry = Registry::new(vec![
            Category::linear("count", "Count", "each", vec![LinearUnit::new("each", "Each", 1.0)]),
        ]);
        let mut c = SyncController::with_registry(
            Arc::new(registry),
            SyncOptions::new().with_default_category("count"),
        );
        assert_eq!(c.state().source_unit, "each");
        assert_eq!(c.state().target_unit, "each");

        c.handle(Event::SourceValueEdited("12".into()), &mut NullView);
        assert_eq!(c.state().target_text, "12");
        assert_eq!(c.state().rate_text, "1 Each = 1 Each");
    }

    #[test]
    fn test_max_decimals_option() {
        let mut c = SyncController::new(SyncOptions::new().with_max_decimals(2));
        c.handle(Event::TargetUnitChanged("foot".into()), &mut NullView);
        c.handle(Event::SourceValueEdited("1".into()), &mut NullView);
        assert_eq!(c.state().target_text, "3.28");
        assert_eq!(c.state().rate_text, "1 Meter = 3.28 Foot");
    }

    #[test]
    fn test_render_pushes_everything() {
        let c = controller();
        let mut view = FieldUpdates::new();
        c.render(&mut view);
        assert_eq!(view.units.as_ref().map(Vec::len), Some(8));
        assert_eq!(view.source_unit.as_deref(), Some("meter"));
        assert_eq!(view.source_text.as_deref(), Some(""));
        assert_eq!(view.rate_text.as_deref(), Some("1 Meter = 0.001 Kilometer"));
    }

    #[test]
    fn test_handling_is_idempotent() {
        let mut a = controller();
        let mut b = controller();
        for c in [&mut a, &mut b] {
            c.handle(Event::CategoryChanged("weight".into()), &mut NullView);
            c.handle(Event::TargetValueEdited("500".into()), &mut NullView);
        }
        a.handle(Event::TargetValueEdited("500".into()), &mut NullView);
        assert_eq!(a.state(), b.state());
    }
}
