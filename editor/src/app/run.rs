use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{
    config::EditorConfig,
    state::{model::Notices, remote::Remote},
    ui::{
        draw,
        screens::{login, Action, Ctx},
    },
};

const TICK: Duration = Duration::from_millis(120);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Runs the editor until the user quits.
///
/// # Arguments
/// * `config` - The resolved editor configuration.
///
/// # Errors
/// Returns an error if the api url is unusable, or terminal setup or
/// rendering fails.
pub fn run(config: EditorConfig) -> Result<()> {
    let mut remote = Remote::new(&config.api_url)?;
    let mut notices = Notices::new();

    let _guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut screen = login::enter(&mut Ctx {
        remote: &remote,
        notices: &mut notices,
        config: &config,
    });

    'ui: loop {
        notices.tick(Instant::now());
        terminal.draw(|f| draw::draw(f, &screen, &notices))?;

        for reply in remote.drain() {
            let mut ctx = Ctx {
                remote: &remote,
                notices: &mut notices,
                config: &config,
            };
            match screen.on_reply(reply, &mut ctx) {
                Action::Quit => break 'ui,
                Action::Transition(next) => screen = next,
                Action::None => {}
            }
        }

        if event::poll(TICK)? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }

                let mut ctx = Ctx {
                    remote: &remote,
                    notices: &mut notices,
                    config: &config,
                };
                match screen.handle_key(k.code, &mut ctx) {
                    Action::Quit => break,
                    Action::Transition(next) => screen = next,
                    Action::None => {}
                }
            }
        }
    }

    log::info!("editor closed");
    terminal.show_cursor()?;
    Ok(())
}
