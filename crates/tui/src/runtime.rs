//! Runtime: terminal lifecycle, event loop, and effect execution.
//!
//! - A dedicated task blocks on `crossterm` input and forwards events over a
//!   channel, keeping `poll()`/`read()` on one thread for reliable delivery.
//! - The main loop `select!`s over input events, completed fetch tasks, and a
//!   tick, applies messages through [`App::update`], and redraws only when
//!   the state is dirty.
//! - Effects returned by `update` become spawned tokio tasks whose results
//!   flow back in as messages — the UI never blocks on the network.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use tokio::task::JoinHandle;
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::warn;

use safra_api::AgroClient;
use safra_engine::CatalogProvider;

use crate::app::{App, Effect, Msg, Route};
use crate::ui;

/// Forward terminal events over a channel from a dedicated polling task.
fn spawn_input_task() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    tokio::spawn(async move {
        let poll_window = Duration::from_millis(16);
        loop {
            match event::poll(poll_window) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if sender.send(ev).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("failed to read terminal event: {}", e);
                        break;
                    }
                },
                Ok(false) => {
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    warn!("failed to poll terminal events: {}", e);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Map a raw key event to a semantic message.
fn translate_key(key: event::KeyEvent) -> Option<Msg> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Msg::Quit);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Msg::Quit),
        KeyCode::Tab => Some(Msg::FocusNext),
        KeyCode::BackTab => Some(Msg::FocusPrev),
        KeyCode::Up | KeyCode::Char('k') => Some(Msg::MoveSelection(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Msg::MoveSelection(1)),
        KeyCode::Enter => Some(Msg::Activate),
        KeyCode::Char('i') => Some(Msg::Submit),
        KeyCode::Char('1') => Some(Msg::SwitchRoute(Route::Consulta)),
        KeyCode::Char('2') => Some(Msg::SwitchRoute(Route::Dashboard)),
        _ => None,
    }
}

/// Spawn one task per effect; each resolves to the message carrying its
/// outcome.
fn execute_effects(
    effects: Vec<Effect>,
    catalog: &Arc<dyn CatalogProvider>,
    pending: &mut FuturesUnordered<JoinHandle<Msg>>,
) {
    for effect in effects {
        let catalog = Arc::clone(catalog);
        let handle = match effect {
            Effect::LoadStates(ticket) => tokio::spawn(async move {
                Msg::StatesLoaded(ticket, catalog.list_states().await)
            }),
            Effect::LoadCities(ticket, state_id) => tokio::spawn(async move {
                Msg::CitiesLoaded(ticket, catalog.list_cities(&state_id).await)
            }),
            Effect::LoadProducts(ticket, city_id) => tokio::spawn(async move {
                Msg::ProductsLoaded(ticket, catalog.list_products(&city_id).await)
            }),
            Effect::LoadFicha(ticket, product, city) => tokio::spawn(async move {
                let result = catalog
                    .fetch_ficha(&product.as_path_segment(), &city)
                    .await;
                Msg::FichaLoaded(ticket, result)
            }),
            Effect::LoadTerrenos => {
                tokio::spawn(async move { Msg::TerrenosLoaded(catalog.list_terrenos().await) })
            }
            Effect::LoadPlanos => {
                tokio::spawn(async move { Msg::PlanosLoaded(catalog.list_planos().await) })
            }
            Effect::SubmitPlan(order) => tokio::spawn(async move {
                let result = catalog
                    .criar_plano(order.terreno_id, &order.csrf_token)
                    .await;
                Msg::SubmitFinished(result)
            }),
            Effect::ScheduleRedirect { delay_ms } => tokio::spawn(async move {
                time::sleep(Duration::from_millis(delay_ms)).await;
                Msg::RedirectDue
            }),
        };
        pending.push(handle);
    }
}

/// Entry point for the TUI runtime: terminal setup, the event loop, and
/// teardown.
pub async fn run_app(catalog: Arc<dyn CatalogProvider>, client: AgroClient) -> Result<()> {
    let mut input_receiver = spawn_input_task();
    let mut terminal = setup_terminal()?;

    let (mut app, initial_effects) = App::new();
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();
    execute_effects(initial_effects, &catalog, &mut pending);

    let mut tick = time::interval(Duration::from_millis(250));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(input_event) = maybe_event else { break Ok(()) };
                match input_event {
                    Event::Key(key) => {
                        if let Some(msg) = translate_key(key) {
                            // The token may have been set by any earlier
                            // response; refresh before acting on input.
                            app.csrf_token = client.csrf_token();
                            let effects = app.update(msg);
                            execute_effects(effects, &catalog, &mut pending);
                        }
                    }
                    Event::Resize(_, _) => app.dirty = true,
                    _ => {}
                }
            }
            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => {
                        let effects = app.update(msg);
                        execute_effects(effects, &catalog, &mut pending);
                    }
                    Err(e) => warn!("background task failed: {}", e),
                }
            }
            _ = tick.tick() => {}
        }

        if app.should_quit {
            break Ok(());
        }
        if app.dirty {
            if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
                break Err(e.into());
            }
            app.dirty = false;
        }
    };

    cleanup_terminal(&mut terminal)?;
    result
}
