//! Rendering for the Safra TUI.
//!
//! Pure drawing: everything shown here comes from the engine's view models.
//! Selector lists always render their leading placeholder row — the
//! equivalent of the original page's disabled `<option>` — and phases that
//! are not interactive render dimmed.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use safra_engine::cascade::{self, DetailPanel, Level, SelectorPhase};
use safra_engine::ficha_view::FichaView;
use safra_engine::plan::{PlanWizard, Submission};
use safra_engine::planos::{PlanoStatusRole, PlanosPanel};

use crate::app::{App, Focus, Route};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    match app.route {
        Route::Consulta => draw_consulta(frame, chunks[1], app),
        Route::Dashboard => draw_dashboard(frame, chunks[1], app),
    }
    draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let tab = |label: &str, active: bool| {
        let style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(label.to_string(), style)
    };
    let line = Line::from(vec![
        Span::styled(" Safra ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        tab("[1] Consulta da Ficha Técnica", app.route == Route::Consulta),
        Span::raw("  "),
        tab("[2] Plano de Plantio", app.route == Route::Dashboard),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.redirect_banner {
        Some(banner) => Line::from(Span::styled(
            banner.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            " Tab foco · ↑↓ navegar · Enter selecionar · i iniciar plano · 1/2 telas · q sair",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_consulta(frame: &mut Frame, area: Rect, app: &mut App) {
    let columns =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(area);
    let selectors = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(columns[0]);

    draw_selector(
        frame,
        selectors[0],
        "Estado",
        Level::States,
        &app.cascade.states,
        app.estados_cursor,
        app.focus == Focus::Estados,
    );
    draw_selector(
        frame,
        selectors[1],
        "Cidade",
        Level::Cities,
        &app.cascade.cities,
        app.cidades_cursor,
        app.focus == Focus::Cidades,
    );
    draw_selector(
        frame,
        selectors[2],
        "Cultivo",
        Level::Products,
        &app.cascade.products,
        app.cultivos_cursor,
        app.focus == Focus::Cultivos,
    );

    draw_detail_panel(frame, columns[1], app);
}

fn draw_selector(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    level: Level,
    phase: &SelectorPhase,
    cursor: usize,
    focused: bool,
) {
    let enabled = phase.is_enabled();
    let mut rows: Vec<ListItem> = Vec::with_capacity(phase.option_count());
    rows.push(ListItem::new(Line::from(Span::styled(
        cascade::placeholder(level, phase).to_string(),
        Style::default().add_modifier(Modifier::ITALIC),
    ))));
    for item in phase.items() {
        rows.push(ListItem::new(item.label.clone()));
    }

    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let body_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let list = List::new(rows)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .style(body_style)
        .highlight_symbol("› ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(cursor.min(phase.option_count().saturating_sub(1))));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title("Ficha Técnica")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines: Vec<Line> = Vec::new();
    match &app.cascade.detail {
        DetailPanel::Ready(view) => lines.extend(ficha_lines(view)),
        other => {
            if let Some((text, is_error)) = other.status_text() {
                let style = if is_error {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                lines.push(Line::from(Span::styled(text, style)));
            }
        }
    }
    if let Some(notice) = app.cascade.product_notice {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn ficha_lines(view: &FichaView) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        view.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for section in &view.sections {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        for field in &section.fields {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}: ", field.label),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(field.value.clone()),
            ]));
        }
    }
    lines
}

fn draw_dashboard(frame: &mut Frame, area: Rect, app: &mut App) {
    let columns =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);
    draw_terrenos(frame, columns[0], app);

    let right = Layout::vertical([
        Constraint::Length(7),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .split(columns[1]);
    draw_terreno_detail(frame, right[0], app);
    draw_wizard_status(frame, right[1], app);
    draw_planos(frame, right[2], app);
}

fn terrenos_placeholder(wizard: &PlanWizard) -> &'static str {
    match wizard {
        PlanWizard::Loading => "Carregando terrenos...",
        PlanWizard::LoadFailed { .. } => "Erro ao carregar",
        PlanWizard::Ready(state) if state.terrenos.is_empty() => "Nenhum terreno encontrado",
        PlanWizard::Ready(_) => "Selecione um terreno",
    }
}

fn draw_terrenos(frame: &mut Frame, area: Rect, app: &App) {
    let enabled = app
        .wizard
        .ready()
        .is_some_and(|state| !state.terrenos.is_empty());

    let mut rows: Vec<ListItem> = vec![ListItem::new(Line::from(Span::styled(
        terrenos_placeholder(&app.wizard).to_string(),
        Style::default().add_modifier(Modifier::ITALIC),
    )))];
    if let Some(state) = app.wizard.ready() {
        for terreno in &state.terrenos {
            rows.push(ListItem::new(format!(
                "{} ({})",
                terreno.nome, terreno.localizacao_display
            )));
        }
    }

    let focused = app.focus == Focus::Terrenos;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let body_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let count = rows.len();
    let list = List::new(rows)
        .block(
            Block::default()
                .title("Terrenos")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .style(body_style)
        .highlight_symbol("› ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.terrenos_cursor.min(count.saturating_sub(1))));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_terreno_detail(frame: &mut Frame, area: Rect, app: &App) {
    let detail = app.wizard.detail();
    let submit_line = match app.wizard.ready().map(|s| &s.submission) {
        Some(Submission::Submitting) => Line::from(Span::styled(
            "Enviando...",
            Style::default().fg(Color::Yellow),
        )),
        Some(Submission::Redirecting { .. }) => Line::from(Span::styled(
            "Redirecionando...",
            Style::default().fg(Color::Green),
        )),
        _ if app.wizard.can_submit() => Line::from(Span::styled(
            format!("[i] Iniciar Plano para {}", detail.nome),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        _ => Line::from(Span::styled(
            "Selecione um Terreno",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let labeled = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
            Span::raw(value.to_string()),
        ])
    };
    let lines = vec![
        labeled("Nome", &detail.nome),
        labeled("Tamanho", &detail.tamanho),
        labeled("Localização", &detail.localizacao),
        Line::default(),
        submit_line,
    ];

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Terreno Selecionado")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn draw_wizard_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, is_error) = match &app.wizard {
        PlanWizard::Loading => ("Carregando terrenos...".to_string(), false),
        PlanWizard::LoadFailed { message } => (message.clone(), true),
        PlanWizard::Ready(state) => (state.status.text.clone(), state.status.is_error),
    };
    let style = if is_error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, style)))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn role_color(role: PlanoStatusRole) -> Color {
    match role {
        PlanoStatusRole::Andamento => Color::Blue,
        PlanoStatusRole::Concluido => Color::Green,
        PlanoStatusRole::Cancelado => Color::Red,
    }
}

fn draw_planos(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Planos;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title("Meus Planos de Plantio")
        .borders(Borders::ALL)
        .border_style(border_style);

    match &app.planos {
        PlanosPanel::Ready(rows) => {
            let items: Vec<ListItem> = rows
                .iter()
                .map(|plano| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                plano.nome.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::raw("  "),
                            Span::styled(
                                format!("[{}]", plano.status),
                                Style::default().fg(role_color(plano.role)),
                            ),
                        ]),
                        Line::from(Span::styled(
                            format!(
                                "  Cultivo: {} | Terreno: {} | {} | Início: {}",
                                plano.cultivo, plano.terreno, plano.localizacao, plano.inicio
                            ),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect();
            let count = items.len();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut state = ListState::default();
            state.select(Some(app.planos_scroll.min(count.saturating_sub(1))));
            frame.render_stateful_widget(list, area, &mut state);
        }
        other => {
            let (text, style) = match other {
                PlanosPanel::Loading => (
                    "Carregando planos...".to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                PlanosPanel::Empty => (
                    PlanosPanel::empty_notice().to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                PlanosPanel::Failed(message) => (
                    message.clone(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                PlanosPanel::Ready(_) => unreachable!(),
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, style)))
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
        }
    }
}
