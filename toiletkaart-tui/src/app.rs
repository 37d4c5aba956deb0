use chrono::Weekday;
use toiletkaart_core::{
    Attribute, Classification, Facility, FilterSpec, Moment, Ownership, Snapshot, Tally,
    TimeOfDay, classify_all,
};
use tracing::warn;

/// Slider position the map starts on, 08:20.
pub(crate) const DEFAULT_SLIDER: u16 = 500;
const SLIDER_POSITIONS: i32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Facilities,
    Filters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterRow {
    Flag(Attribute),
    Ownership,
}

pub(crate) const FILTER_ROWS: [FilterRow; 5] = [
    FilterRow::Flag(Attribute::UrinalOnly),
    FilterRow::Flag(Attribute::Fee),
    FilterRow::Flag(Attribute::Wheelchair),
    FilterRow::Flag(Attribute::WheelchairPlus),
    FilterRow::Ownership,
];

pub(crate) struct App {
    pub municipality: String,
    pub facilities: Vec<Facility>,
    pub classes: Vec<Classification>,

    pub slider: u16,
    pub day: Weekday,
    pub time_filter: bool,
    pub filters: FilterSpec,

    pub focus: Focus,
    pub filter_index: usize,
    pub list_index: usize,
    pub show_details: bool,

    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        municipality: String,
        facilities: Vec<Facility>,
        day: Weekday,
        time: TimeOfDay,
    ) -> Self {
        let mut app = Self {
            municipality,
            facilities,
            classes: Vec::new(),
            slider: time.to_slider(),
            day,
            time_filter: true,
            filters: FilterSpec::default(),
            focus: Focus::Facilities,
            filter_index: 0,
            list_index: 0,
            show_details: false,
            error_message: None,
        };
        app.refresh();
        app
    }

    pub(crate) fn time(&self) -> TimeOfDay {
        TimeOfDay::from_slider(self.slider).unwrap_or(TimeOfDay::MIDNIGHT)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            filters: self.filters.clone(),
            moment: self
                .time_filter
                .then(|| Moment::new(self.day, self.time())),
        }
    }

    /// Re-run the classification for the current UI state.
    pub(crate) fn refresh(&mut self) {
        match classify_all(&self.facilities, &self.snapshot()) {
            Ok(classes) => {
                self.classes = classes;
                self.error_message = None;
            }
            Err(err) => {
                warn!(error = %err, "classification failed");
                self.classes = vec![Classification::Hidden; self.facilities.len()];
                self.error_message = Some(format!("Cannot evaluate opening hours: {err}"));
            }
        }

        let shown = self.shown().len();
        if self.list_index >= shown {
            self.list_index = shown.saturating_sub(1);
        }
        if shown == 0 {
            self.show_details = false;
        }
    }

    /// Facilities that are drawn, with their classification.
    pub(crate) fn shown(&self) -> Vec<(&Facility, Classification)> {
        self.facilities
            .iter()
            .zip(self.classes.iter().copied())
            .filter(|(_, class)| class.is_shown())
            .collect()
    }

    pub(crate) fn selected(&self) -> Option<(&Facility, Classification)> {
        self.shown().get(self.list_index).copied()
    }

    pub(crate) fn tally(&self) -> Tally {
        Tally::from_classes(&self.classes)
    }

    /// Move the time slider, wrapping around the day.
    pub(crate) fn move_slider(&mut self, delta: i32) {
        let position = i32::from(self.slider) - 1 + delta;
        let wrapped = position.rem_euclid(SLIDER_POSITIONS) + 1;
        self.slider = u16::try_from(wrapped).unwrap_or(DEFAULT_SLIDER);
    }

    pub(crate) fn next_day(&mut self) {
        self.day = self.day.succ();
    }

    pub(crate) fn previous_day(&mut self) {
        self.day = self.day.pred();
    }

    pub(crate) fn toggle_time_filter(&mut self) {
        self.time_filter = !self.time_filter;
    }

    pub(crate) fn current_filter_row(&self) -> FilterRow {
        FILTER_ROWS
            .get(self.filter_index)
            .copied()
            .unwrap_or(FilterRow::Ownership)
    }

    /// Switch the selected filter on or off.
    pub(crate) fn toggle_filter_enabled(&mut self) {
        match self.current_filter_row() {
            FilterRow::Flag(attribute) => {
                let predicate = self.filters.predicate_mut(attribute);
                predicate.enabled = !predicate.enabled;
            }
            FilterRow::Ownership => {
                self.filters.ownership.enabled = !self.filters.ownership.enabled;
            }
        }
    }

    /// Flip the yes/no value of the selected boolean filter.
    pub(crate) fn flip_filter_value(&mut self) {
        if let FilterRow::Flag(attribute) = self.current_filter_row() {
            let predicate = self.filters.predicate_mut(attribute);
            predicate.desired = !predicate.desired;
        }
    }

    pub(crate) fn toggle_ownership(&mut self, ownership: Ownership) {
        self.filters.ownership.toggle(ownership);
    }

    pub(crate) fn select_next(&mut self) {
        match self.focus {
            Focus::Facilities => {
                if self.list_index + 1 < self.shown().len() {
                    self.list_index += 1;
                }
            }
            Focus::Filters => {
                if self.filter_index + 1 < FILTER_ROWS.len() {
                    self.filter_index += 1;
                }
            }
        }
    }

    pub(crate) fn select_previous(&mut self) {
        match self.focus {
            Focus::Facilities => self.list_index = self.list_index.saturating_sub(1),
            Focus::Filters => self.filter_index = self.filter_index.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use toiletkaart_core::{DayHours, FacilityId, OpeningHours};

    use super::*;

    fn facility(id: &str, monday: &str, fee: bool) -> Facility {
        let mut days = HashMap::new();
        days.insert(Weekday::Mon, monday.parse::<DayHours>().expect("valid range"));
        Facility {
            id: FacilityId(id.to_owned()),
            name: None,
            location: None,
            opening_hours: OpeningHours::Weekly(days),
            urinal_only: false,
            fee,
            wheelchair: false,
            wheelchair_plus: false,
            ownership: Ownership::Public,
            properties: BTreeMap::new(),
        }
    }

    fn app() -> App {
        App::new(
            "Groningen".to_owned(),
            vec![
                facility("day", "08:00 - 20:00", false),
                facility("night", "22:00 - 02:00", true),
            ],
            Weekday::Mon,
            "12:00".parse().expect("valid time"),
        )
    }

    #[test]
    fn starts_with_time_filter_on() {
        let app = app();
        assert_eq!(app.slider, 720);
        assert_eq!(app.classes, vec![Classification::Open, Classification::Closed]);
        assert_eq!(app.tally().shown(), 2);
    }

    #[test]
    fn slider_wraps_around_the_day() {
        let mut app = app();
        app.slider = 1440;
        app.move_slider(1);
        assert_eq!(app.slider, 1);
        app.move_slider(-2);
        assert_eq!(app.slider, 1439);
        assert_eq!(app.time().to_string(), "23:59");
    }

    #[test]
    fn moving_the_slider_reclassifies() {
        let mut app = app();
        app.move_slider(11 * 60);
        app.refresh();
        assert_eq!(app.time().to_string(), "23:00");
        assert_eq!(app.classes, vec![Classification::Closed, Classification::Open]);
    }

    #[test]
    fn missing_day_is_reported() {
        let mut app = app();
        app.next_day();
        app.refresh();
        assert!(app.error_message.is_some());
        assert!(app.shown().is_empty());

        app.toggle_time_filter();
        app.refresh();
        assert_eq!(app.error_message, None);
        assert_eq!(app.classes, vec![Classification::Visible, Classification::Visible]);
    }

    #[test]
    fn filter_rows_toggle_predicates() {
        let mut app = app();
        app.focus = Focus::Filters;
        app.select_next();
        assert_eq!(app.current_filter_row(), FilterRow::Flag(Attribute::Fee));

        app.toggle_filter_enabled();
        app.refresh();
        assert_eq!(app.classes, vec![Classification::Hidden, Classification::Closed]);

        app.flip_filter_value();
        app.refresh();
        assert_eq!(app.classes, vec![Classification::Open, Classification::Hidden]);
    }

    #[test]
    fn empty_ownership_selection_hides_all() {
        let mut app = app();
        app.filter_index = FILTER_ROWS.len() - 1;
        app.toggle_filter_enabled();
        for ownership in Ownership::ALL {
            app.toggle_ownership(ownership);
        }
        app.refresh();
        assert!(app.shown().is_empty());
        assert_eq!(app.list_index, 0);
        assert!(app.selected().is_none());
    }
}
