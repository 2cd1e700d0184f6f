pub mod home;
pub mod login;
pub mod model;
pub mod register;

use crossterm::event::KeyCode;
use ratatui::{layout::Rect, Frame};

use crate::{
    config::EditorConfig,
    state::{model::Notices, remote::Remote, remote::Reply},
};

pub enum Action {
    None,
    Quit,
    Transition(Screen),
}

pub enum Screen {
    Login(login::LoginState),
    Register(register::RegisterState),
    Home(home::HomeState),
    Model(Box<model::ModelState>),
}

/// What screens may touch while handling input or replies.
pub struct Ctx<'a> {
    pub remote: &'a Remote,
    pub notices: &'a mut Notices,
    pub config: &'a EditorConfig,
}

impl Screen {
    pub fn draw(&self, f: &mut Frame, area: Rect, notices: &Notices) {
        match self {
            Screen::Login(s) => login::draw(f, area, s),
            Screen::Register(s) => register::draw(f, area, s),
            Screen::Home(s) => home::draw(f, area, s),
            Screen::Model(s) => model::draw::draw(f, area, s, notices),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, ctx: &mut Ctx) -> Action {
        match self {
            Screen::Login(s) => login::handle_key(s, key, ctx),
            Screen::Register(s) => register::handle_key(s, key, ctx),
            Screen::Home(s) => home::handle_key(s, key, ctx),
            Screen::Model(s) => model::handle_key(s, key, ctx),
        }
    }

    /// Applies the outcome of a background request.
    pub fn on_reply(&mut self, reply: Reply, ctx: &mut Ctx) -> Action {
        match self {
            Screen::Login(s) => login::on_reply(s, reply, ctx),
            Screen::Register(s) => register::on_reply(s, reply, ctx),
            Screen::Home(s) => home::on_reply(s, reply, ctx),
            Screen::Model(s) => model::on_reply(s, reply, ctx),
        }
    }
}

/// Logs a reply that arrived after its screen was left.
pub(crate) fn stale(reply: &Reply) -> Action {
    log::debug!("ignoring stale reply: {reply:?}");
    Action::None
}
