use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::application::state::{App, AppMode, ContactField, Screen};

/// Routes key events to state transitions based on the current mode.
///
/// Quitting is handled by the event loop, not here: `q` only reaches this
/// handler in modes where it means something else.
pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyEvent) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key),
            AppMode::Search => Self::handle_search_mode(app, key),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyEvent) {
        if app.cookie_popup_visible {
            match key.code {
                KeyCode::Char('y') => {
                    app.accept_cookies();
                    return;
                }
                KeyCode::Char('n') => {
                    app.decline_cookies();
                    return;
                }
                // Everything else keeps working behind the popup.
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('1') => app.go_to(Screen::Home),
            KeyCode::Char('2') => app.go_to(Screen::Shop),
            KeyCode::Char('3') => app.go_to(Screen::Cart),
            KeyCode::Char('4') => app.go_to(Screen::Contact),
            KeyCode::Tab => app.next_screen(),
            KeyCode::BackTab => app.previous_screen(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Char('/') => app.start_search(),
            KeyCode::Char('?') | KeyCode::F(1) => app.open_help(),
            KeyCode::Enter => match app.screen {
                Screen::Home | Screen::Shop => app.add_selected_to_cart(),
                Screen::Cart => app.start_editing(),
                Screen::Contact => {
                    if app.contact.focus == ContactField::Submit {
                        app.submit_contact(Instant::now());
                    } else {
                        app.start_editing();
                    }
                }
            },
            KeyCode::Char('e') if app.screen == Screen::Cart => app.start_editing(),
            KeyCode::Char('+') if app.screen == Screen::Cart => {
                app.increment_selected_quantity()
            }
            KeyCode::Char('-') if app.screen == Screen::Cart => {
                app.decrement_selected_quantity()
            }
            KeyCode::Char('x') | KeyCode::Delete if app.screen == Screen::Cart => {
                app.remove_selected_from_cart()
            }
            KeyCode::Char('c') if app.screen == Screen::Cart => app.clear_cart(),
            _ => {}
        }
    }

    fn handle_search_mode(app: &mut App, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => app.finish_search(),
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.close_help(),
            KeyCode::Down | KeyCode::Char('j') => app.scroll_help_down(),
            KeyCode::Up | KeyCode::Char('k') => app.scroll_help_up(),
            _ => {}
        }
    }
}
