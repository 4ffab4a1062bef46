//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes and session operations.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_password_char, can_add_username_char, App, AppState, LoginFocus, View,
    PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if app.showing_login_form() {
        return handle_login_input(app, key).await;
    }

    handle_posts_input(app, key).await
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password => {
                app.login_focus = LoginFocus::Button;
            }
            LoginFocus::Button => {
                app.attempt_login();
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {
                // Ignore character input on button
            }
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_posts_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('f') => app.fetch_posts(),
        KeyCode::Char('r') => app.refresh_token(),
        KeyCode::Char('l') => app.logout(),
        KeyCode::Esc => {
            // The posts route is reachable without a session; go back to the form
            if !app.controller.is_authenticated() {
                app.controller.clear_error();
                app.view = View::Login;
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.post_selection = 0,
        KeyCode::End => app.select_last(),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use postgate_core::Config;

    use crate::app::tests::test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_input(app, key(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_login_form_typing_and_focus() {
        let mut app = test_app();

        type_str(&mut app, "kyle").await;
        assert_eq!(app.login_username, "kyle");

        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.login_focus, LoginFocus::Password);

        type_str(&mut app, "pw!").await;
        handle_input(&mut app, key(KeyCode::Backspace)).await.unwrap();
        assert_eq!(app.login_password, "pw");

        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.login_focus, LoginFocus::Button);
        type_str(&mut app, "x").await;
        assert_eq!(app.login_username, "kyle");
        assert_eq!(app.login_password, "pw");

        handle_input(&mut app, key(KeyCode::BackTab)).await.unwrap();
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[tokio::test]
    async fn test_login_form_letters_are_not_shortcuts() {
        let mut app = test_app();
        type_str(&mut app, "qflr?").await;
        assert_eq!(app.login_username, "qflr?");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_esc_on_login_form_quits() {
        let mut app = test_app();
        assert!(handle_input(&mut app, key(KeyCode::Esc)).await.unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_submit_empty_form_shows_error() {
        let mut app = test_app();
        app.login_focus = LoginFocus::Button;
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.error_message().as_deref(), Some("Username and password required"));
        assert!(app.showing_login_form());
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let mut app = test_app();
        app.view = View::Posts;

        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert_eq!(app.state, AppState::ConfirmingQuit);

        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_help_overlay_toggle() {
        let mut app = test_app();
        app.view = View::Posts;

        handle_input(&mut app, key(KeyCode::Char('?'))).await.unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);

        // Keys other than close are swallowed
        handle_input(&mut app, key(KeyCode::Char('f'))).await.unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);
        assert_eq!(app.error_message(), None);

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_fetch_on_posts_view_without_session() {
        let mut app = test_app();
        app.view = View::Posts;

        handle_input(&mut app, key(KeyCode::Char('f'))).await.unwrap();
        assert_eq!(
            app.error_message().as_deref(),
            Some("No access token found, please log in")
        );

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.view, View::Login);
        assert_eq!(app.error_message(), None);
        assert!(app.showing_login_form());
    }

    #[tokio::test]
    async fn test_keys_handled_while_request_in_flight() {
        // Accepts connections but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = Config {
            backend_url: format!("http://{}", listener.local_addr().unwrap()),
            ..Config::default()
        };
        let mut app = App::new(config).unwrap();
        app.controller.apply_login(Ok("T".to_string())).unwrap();
        app.view = View::Posts;

        handle_input(&mut app, key(KeyCode::Char('f'))).await.unwrap();
        assert!(app.is_busy());

        handle_input(&mut app, key(KeyCode::Down)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert_eq!(app.state, AppState::ConfirmingQuit);

        app.check_background_tasks();
        assert!(app.is_busy());
        assert!(app.posts().is_empty());
        assert_eq!(app.error_message(), None);
    }
}
