//! The view controller.
//!
//! All client state lives in [`AppState`], owned by a single [`App`]. Input
//! events mutate it and return [`Command`]s for the host to perform
//! (network, history, storage); results come back through the `finish_*`
//! methods together with the ticket that requested them, so a response for a
//! torn-down view is dropped instead of corrupting the current one.

use chrono::{FixedOffset, Locale, NaiveDate};
use rand::Rng;
use tracing::debug;

use december_filter::validate::{CHAR_MAX, CHAR_MIN, char_count, check_length, trim_input};
use december_types::api::SubmitConfessionResponse;
use december_types::models::{Confession, ConfessionId};

use crate::api::ClientError;
use crate::date::format_date;
use crate::season::is_december;
use crate::snowflake::{InvalidRange, Snowfall, SnowflakeConfig};
use crate::view::View;

const GENERIC_SUCCESS: &str = "Tulisanmu telah dilepaskan ke langit Desember";

/// What the host knows about the person looking at the page.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub viewport_width: f64,
    pub offset: FixedOffset,
    pub locale: Locale,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket(u64);

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchListing(ListingTicket),
    Submit { ticket: SubmitTicket, text: String },
    PushHistory(&'static str),
    PersistMusic(bool),
}

#[derive(Debug, Clone)]
pub enum Listing {
    Idle,
    Loading,
    Empty,
    /// Fetch failed; the view offers a retry.
    Failed,
    Falling {
        snowfall: Snowfall,
        confessions: Vec<Confession>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub id: ConfessionId,
    pub text: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct Form {
    pub text: String,
    pub pending: Option<SubmitTicket>,
    pub notice: Option<FormNotice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    TooShort,
    NearLimit,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub count: usize,
    pub max: usize,
    pub state: CounterState,
}

impl CharCounter {
    pub fn of(text: &str) -> Self {
        let count = char_count(text);
        let state = if count < CHAR_MIN {
            CounterState::TooShort
        } else if count > CHAR_MAX - 100 {
            CounterState::NearLimit
        } else {
            CounterState::Ok
        };
        Self {
            count,
            max: CHAR_MAX,
            state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    AlreadySubmitting,
    /// Outside December the form is closed.
    Locked,
    Length { count: usize },
}

/// Where a click landed. A snowflake consumes its click; only the modal
/// backdrop dismisses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Snowflake(ConfessionId),
    ModalBackdrop,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub modal: Option<Modal>,
    pub music_playing: bool,
    pub listing: Listing,
    pub form: Form,
}

pub struct App {
    state: AppState,
    viewer: Viewer,
    snowflakes: SnowflakeConfig,
    next_ticket: u64,
    current_listing: Option<ListingTicket>,
}

impl App {
    /// Boot on whatever path the browser opened.
    pub fn start(path: &str, viewer: Viewer, music_playing: bool) -> (Self, Vec<Command>) {
        let mut app = Self {
            state: AppState {
                view: View::Home,
                modal: None,
                music_playing,
                listing: Listing::Idle,
                form: Form::default(),
            },
            viewer,
            snowflakes: SnowflakeConfig::default(),
            next_ticket: 0,
            current_listing: None,
        };
        let commands = app.enter(View::from_path(path));
        (app, commands)
    }

    pub fn with_snowflake_config(mut self, config: SnowflakeConfig) -> Result<Self, InvalidRange> {
        config.validate()?;
        self.snowflakes = config;
        Ok(self)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        is_december(&self.viewer.today)
    }

    fn ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn enter(&mut self, view: View) -> Vec<Command> {
        self.state.modal = None;
        self.state.view = view;
        self.state.listing = Listing::Idle;
        self.current_listing = None;

        match view {
            View::Snowfall => vec![self.start_listing()],
            View::Home | View::About => Vec::new(),
        }
    }

    fn start_listing(&mut self) -> Command {
        let ticket = ListingTicket(self.ticket());
        self.current_listing = Some(ticket);
        self.state.listing = Listing::Loading;
        Command::FetchListing(ticket)
    }

    /// User-initiated navigation; records a history entry.
    pub fn navigate(&mut self, view: View) -> Vec<Command> {
        let mut commands = self.enter(view);
        commands.push(Command::PushHistory(view.path()));
        commands
    }

    /// Back/forward: restore the view without touching history.
    pub fn pop_state(&mut self, path: &str) -> Vec<Command> {
        self.enter(View::from_path(path))
    }

    /// Re-fetch the listing; only meaningful on the snowfall view.
    pub fn refresh(&mut self) -> Vec<Command> {
        if self.state.view != View::Snowfall {
            return Vec::new();
        }
        self.state.modal = None;
        vec![self.start_listing()]
    }

    /// Returns whether the result was applied.
    pub fn finish_listing<R: Rng + ?Sized>(
        &mut self,
        ticket: ListingTicket,
        result: Result<Vec<Confession>, ClientError>,
        rng: &mut R,
    ) -> bool {
        if self.state.view != View::Snowfall || self.current_listing != Some(ticket) {
            debug!("Dropping stale listing response {:?}", ticket);
            return false;
        }
        self.current_listing = None;

        self.state.listing = match result {
            Ok(confessions) if confessions.is_empty() => Listing::Empty,
            Ok(confessions) => Listing::Falling {
                snowfall: Snowfall::new(&confessions, self.viewer.viewport_width, self.snowflakes, rng),
                confessions,
            },
            Err(e) => {
                debug!("Listing failed: {}", e);
                Listing::Failed
            }
        };
        true
    }

    /// A snowflake finished one fall.
    pub fn animation_iteration<R: Rng + ?Sized>(
        &mut self,
        id: &ConfessionId,
        rng: &mut R,
    ) -> Option<f64> {
        match &mut self.state.listing {
            Listing::Falling { snowfall, .. } => snowfall.on_iteration(id, rng),
            _ => None,
        }
    }

    pub fn resize(&mut self, viewport_width: f64) {
        self.viewer.viewport_width = viewport_width;
        if let Listing::Falling { snowfall, .. } = &mut self.state.listing {
            snowfall.set_viewport_width(viewport_width);
        }
    }

    pub fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Snowflake(id) => self.open_modal(id),
            ClickTarget::ModalBackdrop => self.close_modal(),
        }
    }

    fn open_modal(&mut self, id: ConfessionId) {
        let Listing::Falling { confessions, .. } = &self.state.listing else {
            return;
        };
        if let Some(c) = confessions.iter().find(|c| c.id == id) {
            self.state.modal = Some(Modal {
                id,
                text: c.text.clone(),
                date: format_date(c.created_at, &self.viewer.offset, self.viewer.locale),
            });
        }
    }

    pub fn close_modal(&mut self) {
        self.state.modal = None;
    }

    pub fn key_escape(&mut self) {
        self.close_modal();
    }

    pub fn input(&mut self, text: &str) {
        self.state.form.text = text.to_string();
    }

    pub fn counter(&self) -> CharCounter {
        CharCounter::of(&self.state.form.text)
    }

    /// Starts a submission unless one is already in flight. The control
    /// stays disabled until [`App::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<Command, SubmitRejection> {
        if self.state.form.pending.is_some() {
            return Err(SubmitRejection::AlreadySubmitting);
        }
        if !self.is_open() {
            return Err(SubmitRejection::Locked);
        }

        let text = trim_input(&self.state.form.text).to_string();
        self.state.form.notice = None;
        if let Err(e) = check_length(&text) {
            self.state.form.notice = Some(FormNotice::Error(e.to_string()));
            return Err(SubmitRejection::Length {
                count: char_count(&text),
            });
        }

        let ticket = SubmitTicket(self.ticket());
        self.state.form.pending = Some(ticket);
        Ok(Command::Submit { ticket, text })
    }

    /// Re-enables the form. Text is cleared only on success.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<SubmitConfessionResponse, ClientError>,
    ) -> bool {
        if self.state.form.pending != Some(ticket) {
            return false;
        }
        self.state.form.pending = None;

        self.state.form.notice = Some(match result {
            Ok(resp) => {
                self.state.form.text.clear();
                let message = if resp.message.is_empty() {
                    GENERIC_SUCCESS.to_string()
                } else {
                    resp.message
                };
                FormNotice::Success(message)
            }
            Err(e) => FormNotice::Error(e.user_message()),
        });
        true
    }

    pub fn dismiss_notice(&mut self) {
        self.state.form.notice = None;
    }

    pub fn toggle_music(&mut self) -> Command {
        self.state.music_playing = !self.state.music_playing;
        Command::PersistMusic(self.state.music_playing)
    }

    pub fn render(&self) -> Screen<'_> {
        match self.state.view {
            View::Home => Screen::Home(self.render_home()),
            View::Snowfall => Screen::Snowfall(SnowfallScreen {
                listing: &self.state.listing,
                modal: self.state.modal.as_ref(),
            }),
            View::About => Screen::About(AboutScreen {
                title: "Tentang Project-December",
                sections: ABOUT_SECTIONS,
            }),
        }
    }

    fn render_home(&self) -> HomeScreen<'_> {
        if !self.is_open() {
            return HomeScreen {
                badge: "Not December Yet",
                form: FormScreen::Locked,
            };
        }

        let submitting = self.state.form.pending.is_some();
        HomeScreen {
            badge: "It's December Again",
            form: FormScreen::Open {
                text: &self.state.form.text,
                counter: self.counter(),
                submit_enabled: !submitting,
                submit_label: if submitting { "Melepaskan..." } else { "Lepaskan" },
                notice: self.state.form.notice.as_ref(),
            },
        }
    }
}

// -- View models --

#[derive(Debug)]
pub enum Screen<'a> {
    Home(HomeScreen<'a>),
    Snowfall(SnowfallScreen<'a>),
    About(AboutScreen),
}

#[derive(Debug)]
pub struct HomeScreen<'a> {
    pub badge: &'static str,
    pub form: FormScreen<'a>,
}

#[derive(Debug)]
pub enum FormScreen<'a> {
    Locked,
    Open {
        text: &'a str,
        counter: CharCounter,
        submit_enabled: bool,
        submit_label: &'static str,
        notice: Option<&'a FormNotice>,
    },
}

#[derive(Debug)]
pub struct SnowfallScreen<'a> {
    pub listing: &'a Listing,
    pub modal: Option<&'a Modal>,
}

#[derive(Debug)]
pub struct AboutScreen {
    pub title: &'static str,
    pub sections: &'static [(&'static str, &'static str)],
}

const ABOUT_SECTIONS: &[(&str, &str)] = &[
    (
        "Apa itu Project-December?",
        "Ruang anonim musiman untuk menuliskan pengalaman, penyesalan, atau kenangan yang dibawa sepanjang tahun. Setiap tulisan jatuh sebagai butiran salju.",
    ),
    (
        "Bagaimana cara kerjanya?",
        "Kotak tulisan hanya terbuka di bulan Desember. Di halaman salju, klik butiran untuk membaca tulisan lengkap beserta tanggalnya.",
    ),
    (
        "Menjaga ruang ini tetap aman",
        "Kata-kata kasar disaring agar tempat ini tetap nyaman bagi siapa pun yang sedang rapuh.",
    ),
];
