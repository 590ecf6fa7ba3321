//! Application state and logic for the Safra TUI.
//!
//! TEA-shaped: [`App`] owns all state, [`Msg`] enumerates every user action
//! and completed fetch, [`App::update`] applies a message and returns the
//! [`Effect`]s the runtime must execute (spawned fetches, the post-submit
//! redirect timer). Completed-fetch messages carry their [`LoadTicket`] so
//! the cascade can discard responses for superseded selections.

use safra_engine::cascade::{Cascade, Level, LoadTicket};
use safra_engine::plan::{PlanWizard, SubmitOrder};
use safra_engine::planos::PlanosPanel;
use safra_engine::FetchError;
use safra_types::{CriarPlanoResponse, FichaTecnica, ItemId, PlanoResumo, SelectableItem, Terreno};

/// Top-level screens: the technical-sheet consultation and the dashboard
/// wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Consulta,
    Dashboard,
}

/// Which panel currently receives list navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Estados,
    Cidades,
    Cultivos,
    Terrenos,
    Planos,
}

/// Messages that update the application state.
#[derive(Debug, Clone)]
pub enum Msg {
    SwitchRoute(Route),
    FocusNext,
    FocusPrev,
    /// Move the focused list cursor by the given offset.
    MoveSelection(isize),
    /// Commit the focused list's cursor (the `<select>` change event).
    Activate,
    /// Start the plan for the selected plot.
    Submit,
    StatesLoaded(LoadTicket, Result<Vec<SelectableItem>, FetchError>),
    CitiesLoaded(LoadTicket, Result<Vec<SelectableItem>, FetchError>),
    ProductsLoaded(LoadTicket, Result<Vec<SelectableItem>, FetchError>),
    FichaLoaded(LoadTicket, Result<FichaTecnica, FetchError>),
    TerrenosLoaded(Result<Vec<Terreno>, FetchError>),
    PlanosLoaded(Result<Vec<PlanoResumo>, FetchError>),
    SubmitFinished(Result<CriarPlanoResponse, FetchError>),
    /// The post-submit delay elapsed.
    RedirectDue,
    Quit,
}

/// Side effects the runtime executes on behalf of `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadStates(LoadTicket),
    LoadCities(LoadTicket, ItemId),
    LoadProducts(LoadTicket, ItemId),
    /// Fetch the sheet for (product, city).
    LoadFicha(LoadTicket, ItemId, ItemId),
    LoadTerrenos,
    LoadPlanos,
    SubmitPlan(SubmitOrder),
    ScheduleRedirect { delay_ms: u64 },
}

/// Central state container for the TUI.
pub struct App {
    pub route: Route,
    pub focus: Focus,
    pub cascade: Cascade,
    pub wizard: PlanWizard,
    pub planos: PlanosPanel,
    /// Cursor per selector list; row 0 is the placeholder.
    pub estados_cursor: usize,
    pub cidades_cursor: usize,
    pub cultivos_cursor: usize,
    pub terrenos_cursor: usize,
    pub planos_scroll: usize,
    /// Anti-forgery token, refreshed by the runtime before input handling.
    pub csrf_token: Option<String>,
    /// Where the wizard redirected to, once the delay elapsed.
    pub redirect_banner: Option<String>,
    pub dirty: bool,
    pub should_quit: bool,
}

impl App {
    /// Build the initial state and the page-load effects: the original page
    /// fires the region, plot, and plan fetches on load.
    pub fn new() -> (Self, Vec<Effect>) {
        let mut cascade = Cascade::new();
        let states_ticket = cascade.begin_states_load();
        let app = Self {
            route: Route::default(),
            focus: Focus::Estados,
            cascade,
            wizard: PlanWizard::default(),
            planos: PlanosPanel::Loading,
            estados_cursor: 0,
            cidades_cursor: 0,
            cultivos_cursor: 0,
            terrenos_cursor: 0,
            planos_scroll: 0,
            csrf_token: None,
            redirect_banner: None,
            dirty: true,
            should_quit: false,
        };
        let effects = vec![
            Effect::LoadStates(states_ticket),
            Effect::LoadTerrenos,
            Effect::LoadPlanos,
        ];
        (app, effects)
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        self.dirty = true;
        let mut effects = Vec::new();
        match msg {
            Msg::Quit => self.should_quit = true,
            Msg::SwitchRoute(route) => {
                if self.route != route {
                    self.route = route;
                    self.focus = match route {
                        Route::Consulta => Focus::Estados,
                        Route::Dashboard => Focus::Terrenos,
                    };
                }
            }
            Msg::FocusNext => self.focus = self.cycle_focus(true),
            Msg::FocusPrev => self.focus = self.cycle_focus(false),
            Msg::MoveSelection(delta) => self.move_cursor(delta),
            Msg::Activate => effects.extend(self.activate()),
            Msg::Submit => {
                let token = self.csrf_token.clone();
                if let Some(order) = self.wizard.begin_submit(token.as_deref()) {
                    effects.push(Effect::SubmitPlan(order));
                }
            }
            Msg::StatesLoaded(ticket, result) => {
                self.cascade.apply_states(ticket, result);
                self.estados_cursor = 0;
            }
            Msg::CitiesLoaded(ticket, result) => {
                self.cascade.apply_cities(ticket, result);
                self.cidades_cursor = 0;
            }
            Msg::ProductsLoaded(ticket, result) => {
                self.cascade.apply_products(ticket, result);
                self.cultivos_cursor = 0;
            }
            Msg::FichaLoaded(ticket, result) => self.cascade.apply_ficha(ticket, result),
            Msg::TerrenosLoaded(result) => {
                self.wizard.apply_load(result);
                self.terrenos_cursor = 0;
            }
            Msg::PlanosLoaded(result) => {
                self.planos = PlanosPanel::apply(result);
                self.planos_scroll = 0;
            }
            Msg::SubmitFinished(result) => {
                if let Some(redirect) = self.wizard.apply_submit_result(result) {
                    effects.push(Effect::ScheduleRedirect {
                        delay_ms: redirect.delay_ms,
                    });
                }
            }
            Msg::RedirectDue => {
                if let Some(url) = self.wizard.complete_redirect() {
                    self.redirect_banner = Some(format!("Plano iniciado. Continue em: {}", url));
                    // The dashboard the user lands back on shows the new plan.
                    effects.push(Effect::LoadPlanos);
                }
            }
        }
        effects
    }

    fn cycle_focus(&self, forward: bool) -> Focus {
        let ring: &[Focus] = match self.route {
            Route::Consulta => &[Focus::Estados, Focus::Cidades, Focus::Cultivos],
            Route::Dashboard => &[Focus::Terrenos, Focus::Planos],
        };
        let current = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % ring.len()
        } else {
            (current + ring.len() - 1) % ring.len()
        };
        ring[next]
    }

    fn move_cursor(&mut self, delta: isize) {
        let (cursor, count) = match self.focus {
            Focus::Estados => (&mut self.estados_cursor, self.cascade.states.option_count()),
            Focus::Cidades => (&mut self.cidades_cursor, self.cascade.cities.option_count()),
            Focus::Cultivos => (&mut self.cultivos_cursor, self.cascade.products.option_count()),
            Focus::Terrenos => {
                let len = self.wizard.ready().map_or(0, |s| s.terrenos.len());
                (&mut self.terrenos_cursor, len + 1)
            }
            Focus::Planos => {
                let len = match &self.planos {
                    PlanosPanel::Ready(rows) => rows.len(),
                    _ => 0,
                };
                (&mut self.planos_scroll, len.max(1))
            }
        };
        let moved = if delta >= 0 {
            cursor.saturating_add(delta as usize)
        } else {
            cursor.saturating_sub(delta.unsigned_abs())
        };
        *cursor = moved.min(count.saturating_sub(1));
    }

    /// Commit the focused cursor, mirroring the original selectors' change
    /// events: row 0 clears the level, any other row selects that item.
    fn activate(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.focus {
            Focus::Estados => {
                if !self.cascade.states.is_enabled() {
                    return effects;
                }
                let id = self.item_at(Level::States, self.estados_cursor);
                self.cidades_cursor = 0;
                self.cultivos_cursor = 0;
                // A ticket is only issued for a real selection.
                if let (Some(ticket), Some(id)) = (self.cascade.state_changed(id.clone()), id) {
                    effects.push(Effect::LoadCities(ticket, id));
                }
            }
            Focus::Cidades => {
                if !self.cascade.cities.is_enabled() {
                    return effects;
                }
                let id = self.item_at(Level::Cities, self.cidades_cursor);
                self.cultivos_cursor = 0;
                if let (Some(ticket), Some(id)) = (self.cascade.city_changed(id.clone()), id) {
                    effects.push(Effect::LoadProducts(ticket, id));
                }
            }
            Focus::Cultivos => {
                if !self.cascade.products.is_enabled() {
                    return effects;
                }
                let id = self.item_at(Level::Products, self.cultivos_cursor);
                if let Some(ticket) = self.cascade.product_changed(id) {
                    if let Some((product, city)) = self.cascade.terminal_selection() {
                        effects.push(Effect::LoadFicha(ticket, product, city));
                    }
                }
            }
            Focus::Terrenos => {
                // Row 0 is the placeholder; the engine treats the resulting
                // out-of-range index as "nothing selected".
                let index = self.terrenos_cursor.checked_sub(1).unwrap_or(usize::MAX);
                self.wizard.select(index);
            }
            Focus::Planos => {}
        }
        effects
    }

    fn item_at(&self, level: Level, cursor: usize) -> Option<ItemId> {
        let phase = match level {
            Level::States => &self.cascade.states,
            Level::Cities => &self.cascade.cities,
            Level::Products => &self.cascade.products,
            Level::Ficha => return None,
        };
        cursor
            .checked_sub(1)
            .and_then(|i| phase.items().get(i))
            .map(|item| item.id.clone())
    }
}
