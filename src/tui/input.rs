use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::{app::App, event::AppEvent};

const PAGE: isize = 10;

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if control => app.events.send(AppEvent::Close),
        KeyCode::Esc => app.events.send(AppEvent::Close),
        KeyCode::Char('o') if control => app.events.send(AppEvent::ChooseFolder),
        KeyCode::Char('u') if control => app.set_input(""),
        KeyCode::Enter => app.events.send(AppEvent::FreezeDry),
        KeyCode::Char(c) if !control => {
            let mut input = app.resolver.input().to_string();
            input.push(c);
            app.set_input(&input);
        }
        KeyCode::Backspace => {
            let mut input = app.resolver.input().to_string();
            if input.pop().is_some() {
                app.set_input(&input);
            }
        }
        KeyCode::Up => app.scroll_by(-1),
        KeyCode::Down => app.scroll_by(1),
        KeyCode::PageUp => app.scroll_by(-PAGE),
        KeyCode::PageDown => app.scroll_by(PAGE),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::resolver::ResolveState;
    use crate::presenter::{BridgeAccessor, DownloadOrchestrator};
    use crate::tui::event::{Event, EventHandler};

    fn app() -> App {
        let accessor = BridgeAccessor::pending();
        let orchestrator = DownloadOrchestrator::default();
        let events = EventHandler::new(accessor.clone(), orchestrator.clone());
        App::new(accessor, orchestrator, events)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn press_control(app: &mut App, c: char) {
        handle_key_event(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)).unwrap();
    }

    #[tokio::test]
    async fn test_typing_edits_the_link() {
        let mut app = app();
        for c in "spotify".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.resolver.input(), "spotif");
        assert_eq!(app.resolver.state(), &ResolveState::Pending);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.resolver.input(), "spoti");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.resolver.state(), &ResolveState::Empty);
    }

    #[tokio::test]
    async fn test_control_u_clears_the_link() {
        let mut app = app();
        app.set_input("https://open.spotify.com/album/abc");
        press_control(&mut app, 'u');

        assert_eq!(app.resolver.input(), "");
        assert_eq!(app.resolver.state(), &ResolveState::Empty);
    }

    #[tokio::test]
    async fn test_shortcuts_queue_app_events() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press_control(&mut app, 'o');
        press(&mut app, KeyCode::Esc);

        for expected in [AppEvent::FreezeDry, AppEvent::ChooseFolder, AppEvent::Close] {
            match app.events.next().await.unwrap() {
                Event::App(event) => assert_eq!(event, expected),
                other => panic!("unexpected event {other:?}"),
            }
        }
        // Control shortcuts don't end up in the link
        assert_eq!(app.resolver.input(), "");
    }
}
