use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use toiletkaart_core::Ownership;

use crate::app::{App, Focus};

const COARSE_STEP: i32 = 15;
const FINE_STEP: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// UI state changed; re-run the classification
    Reclassify,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    if app.show_details {
        if matches!(key.code, Esc | Enter | Char('b')) {
            app.show_details = false;
        }
        return Action::None;
    }

    match key.code {
        Left => {
            app.move_slider(-COARSE_STEP);
            Action::Reclassify
        }
        Right => {
            app.move_slider(COARSE_STEP);
            Action::Reclassify
        }
        Char(',') => {
            app.move_slider(-FINE_STEP);
            Action::Reclassify
        }
        Char('.') => {
            app.move_slider(FINE_STEP);
            Action::Reclassify
        }
        Char('[') => {
            app.previous_day();
            Action::Reclassify
        }
        Char(']') => {
            app.next_day();
            Action::Reclassify
        }
        Char('t') => {
            app.toggle_time_filter();
            Action::Reclassify
        }
        Char(digit @ '1'..='3') => {
            let ownership = match digit {
                '1' => Ownership::Public,
                '2' => Ownership::Private,
                _ => Ownership::Municipal,
            };
            app.toggle_ownership(ownership);
            Action::Reclassify
        }
        Tab | BackTab => {
            app.focus = match app.focus {
                Focus::Facilities => Focus::Filters,
                Focus::Filters => Focus::Facilities,
            };
            Action::None
        }
        Up | Char('k') => {
            app.select_previous();
            Action::None
        }
        Down | Char('j') => {
            app.select_next();
            Action::None
        }
        Char(' ') if app.focus == Focus::Filters => {
            app.toggle_filter_enabled();
            Action::Reclassify
        }
        Char('v') | Enter if app.focus == Focus::Filters => {
            app.flip_filter_value();
            Action::Reclassify
        }
        Enter => {
            app.show_details = app.selected().is_some();
            Action::None
        }
        _ => Action::None,
    }
}
