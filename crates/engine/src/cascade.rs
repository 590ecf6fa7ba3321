//! The selection cascade: state → city → crop → technical sheet.
//!
//! All cascade behavior is synchronous state held in [`Cascade`]; the front
//! ends perform the actual fetches and feed results back in. Two invariants
//! drive every transition:
//!
//! - changing (or clearing) level *k* resets every level below it to its
//!   "awaiting parent" state and clears the detail panel, because the old
//!   downstream chain is no longer valid;
//! - each level carries a generation counter, bumped on every change, and
//!   fetch results are applied only if their [`LoadTicket`] is still current.
//!   Last *issued* wins: a slow response for a superseded selection is
//!   discarded even if it resolves after the newer one.

use safra_types::{FichaTecnica, ItemId, SelectableItem};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::ficha_view::FichaView;

/// Inline notice shown under the crop selector when a city has no crops.
pub const NO_PRODUCTS_NOTICE: &str =
    "Nenhum cultivo cadastrado para esta cidade na Ficha Técnica.";
/// Inline notice shown under the crop selector on a fetch failure.
pub const PRODUCTS_ERROR_NOTICE: &str = "Erro ao conectar com o serviço de dados.";

/// One cascade level (plus the terminal sheet fetch, for ticket purposes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    States = 0,
    Cities = 1,
    Products = 2,
    Ficha = 3,
}

/// Proof that a fetch was issued for a specific level and generation.
///
/// Returned when a transition requires a fetch; handed back with the result.
/// A ticket whose generation is no longer current is ignored on application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub level: Level,
    generation: u64,
}

/// The enumerated states of one selector.
///
/// A rendered selector always shows a leading placeholder row, so a `Ready`
/// list of N items displays N+1 options. Only `Ready` with items is
/// interactive — every other phase is the equivalent of a disabled control.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPhase {
    /// No parent selected yet; no request may be issued.
    AwaitingParent,
    /// A fetch is in flight.
    Loading,
    /// Items loaded and selectable.
    Ready { items: Vec<SelectableItem> },
    /// The fetch succeeded but returned zero items.
    Empty,
    /// The fetch failed; the user must change the parent (or restart) to retry.
    Failed,
}

impl SelectorPhase {
    pub fn is_enabled(&self) -> bool {
        matches!(self, SelectorPhase::Ready { items } if !items.is_empty())
    }

    pub fn items(&self) -> &[SelectableItem] {
        match self {
            SelectorPhase::Ready { items } => items,
            _ => &[],
        }
    }

    /// Rows a rendered selector shows: leading placeholder + items.
    pub fn option_count(&self) -> usize {
        1 + self.items().len()
    }
}

/// Placeholder text for a selector's leading row, by level and phase.
pub fn placeholder(level: Level, phase: &SelectorPhase) -> &'static str {
    use SelectorPhase::*;
    match (level, phase) {
        (Level::States, Loading) => "Carregando estados...",
        (Level::States, Ready { .. }) => "Selecione o Estado",
        (Level::States, Empty) => "Nenhum estado disponível",
        (Level::States, _) => "Erro ao carregar",

        (Level::Cities, AwaitingParent) => "Selecione um estado primeiro",
        (Level::Cities, Loading) => "Carregando cidades...",
        (Level::Cities, Ready { .. }) => "Selecione a Cidade",
        (Level::Cities, Empty) => "Nenhuma cidade disponível",
        (Level::Cities, Failed) => "Erro ao carregar",

        (Level::Products, AwaitingParent) => "Selecione uma cidade primeiro",
        (Level::Products, Loading) => "Carregando produtos...",
        (Level::Products, Ready { .. }) => "Selecione o Cultivo",
        (Level::Products, Empty) => "Nenhum produto disponível",
        (Level::Products, Failed) => "Erro ao carregar",

        (Level::Ficha, _) => "",
    }
}

/// Status of the technical-sheet panel.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPanel {
    /// Awaiting a full selection chain.
    Prompt,
    Loading,
    /// Expected miss: no sheet exists for this selection.
    NotFound,
    /// Transport or server failure.
    ConnectionError,
    Ready(FichaView),
}

impl DetailPanel {
    /// Status line for the non-`Ready` phases, with its error flag.
    pub fn status_text(&self) -> Option<(&'static str, bool)> {
        match self {
            DetailPanel::Prompt => {
                Some(("Selecione um estado, cidade e cultivo para ver os dados.", false))
            }
            DetailPanel::Loading => Some(("Carregando Ficha Técnica...", false)),
            DetailPanel::NotFound => {
                Some(("Erro: Ficha Técnica não encontrada para a seleção.", true))
            }
            DetailPanel::ConnectionError => {
                Some(("Erro de conexão ao buscar os dados detalhados.", true))
            }
            DetailPanel::Ready(_) => None,
        }
    }
}

/// Component-scoped state of the three-selector cascade and its detail panel.
#[derive(Debug)]
pub struct Cascade {
    pub states: SelectorPhase,
    pub cities: SelectorPhase,
    pub products: SelectorPhase,
    pub detail: DetailPanel,
    /// Inline message under the crop selector (empty list or fetch failure).
    pub product_notice: Option<&'static str>,
    chosen_state: Option<ItemId>,
    chosen_city: Option<ItemId>,
    chosen_product: Option<ItemId>,
    generations: [u64; 4],
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    pub fn new() -> Self {
        Self {
            states: SelectorPhase::Loading,
            cities: SelectorPhase::AwaitingParent,
            products: SelectorPhase::AwaitingParent,
            detail: DetailPanel::Prompt,
            product_notice: None,
            chosen_state: None,
            chosen_city: None,
            chosen_product: None,
            generations: [0; 4],
        }
    }

    pub fn chosen_state(&self) -> Option<&ItemId> {
        self.chosen_state.as_ref()
    }

    pub fn chosen_city(&self) -> Option<&ItemId> {
        self.chosen_city.as_ref()
    }

    pub fn chosen_product(&self) -> Option<&ItemId> {
        self.chosen_product.as_ref()
    }

    /// The fully qualified terminal selection, when the chain is complete.
    pub fn terminal_selection(&self) -> Option<(ItemId, ItemId)> {
        Some((self.chosen_product.clone()?, self.chosen_city.clone()?))
    }

    fn ticket(&mut self, level: Level) -> LoadTicket {
        let slot = &mut self.generations[level as usize];
        *slot += 1;
        LoadTicket {
            level,
            generation: *slot,
        }
    }

    /// Invalidate any in-flight fetch for a level without issuing a new one.
    fn invalidate(&mut self, level: Level) {
        self.generations[level as usize] += 1;
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generations[ticket.level as usize] == ticket.generation
    }

    /// Start the initial region load.
    pub fn begin_states_load(&mut self) -> LoadTicket {
        self.states = SelectorPhase::Loading;
        self.ticket(Level::States)
    }

    pub fn apply_states(&mut self, ticket: LoadTicket, result: Result<Vec<SelectableItem>, FetchError>) {
        if ticket.level != Level::States || !self.is_current(ticket) {
            debug!("discarding stale state list");
            return;
        }
        self.states = match result {
            Ok(items) if items.is_empty() => SelectorPhase::Empty,
            Ok(items) => SelectorPhase::Ready { items },
            Err(e) => {
                warn!(error = %e, "failed to load states");
                SelectorPhase::Failed
            }
        };
    }

    /// The user picked (or cleared) a region.
    ///
    /// Clearing issues no request. Either way the city and crop selectors and
    /// the detail panel reset, and any in-flight downstream fetch becomes
    /// stale.
    pub fn state_changed(&mut self, id: Option<ItemId>) -> Option<LoadTicket> {
        self.chosen_state = id;
        self.chosen_city = None;
        self.chosen_product = None;
        self.products = SelectorPhase::AwaitingParent;
        self.invalidate(Level::Products);
        self.detail = DetailPanel::Prompt;
        self.invalidate(Level::Ficha);
        self.product_notice = None;

        if self.chosen_state.is_some() {
            self.cities = SelectorPhase::Loading;
            Some(self.ticket(Level::Cities))
        } else {
            self.cities = SelectorPhase::AwaitingParent;
            self.invalidate(Level::Cities);
            None
        }
    }

    pub fn apply_cities(&mut self, ticket: LoadTicket, result: Result<Vec<SelectableItem>, FetchError>) {
        if ticket.level != Level::Cities || !self.is_current(ticket) {
            debug!("discarding stale city list");
            return;
        }
        self.cities = match result {
            Ok(items) if items.is_empty() => SelectorPhase::Empty,
            Ok(items) => SelectorPhase::Ready { items },
            Err(e) => {
                warn!(error = %e, state = ?self.chosen_state, "failed to load cities");
                SelectorPhase::Failed
            }
        };
    }

    /// The user picked (or cleared) a city.
    pub fn city_changed(&mut self, id: Option<ItemId>) -> Option<LoadTicket> {
        self.chosen_city = id;
        self.chosen_product = None;
        self.detail = DetailPanel::Prompt;
        self.invalidate(Level::Ficha);
        self.product_notice = None;

        if self.chosen_city.is_some() {
            self.products = SelectorPhase::Loading;
            Some(self.ticket(Level::Products))
        } else {
            self.products = SelectorPhase::AwaitingParent;
            self.invalidate(Level::Products);
            None
        }
    }

    pub fn apply_products(&mut self, ticket: LoadTicket, result: Result<Vec<SelectableItem>, FetchError>) {
        if ticket.level != Level::Products || !self.is_current(ticket) {
            debug!("discarding stale product list");
            return;
        }
        match result {
            Ok(items) if items.is_empty() => {
                self.products = SelectorPhase::Empty;
                self.product_notice = Some(NO_PRODUCTS_NOTICE);
            }
            Ok(items) => {
                self.products = SelectorPhase::Ready { items };
            }
            Err(e) => {
                warn!(error = %e, city = ?self.chosen_city, "failed to load products");
                self.products = SelectorPhase::Failed;
                self.product_notice = Some(PRODUCTS_ERROR_NOTICE);
            }
        }
    }

    /// The user picked (or cleared) a crop. A full chain starts the sheet
    /// fetch; anything less returns the panel to its prompt.
    pub fn product_changed(&mut self, id: Option<ItemId>) -> Option<LoadTicket> {
        self.chosen_product = id;
        if self.chosen_product.is_some() && self.chosen_city.is_some() {
            self.product_notice = None;
            self.detail = DetailPanel::Loading;
            Some(self.ticket(Level::Ficha))
        } else {
            self.detail = DetailPanel::Prompt;
            self.invalidate(Level::Ficha);
            None
        }
    }

    pub fn apply_ficha(&mut self, ticket: LoadTicket, result: Result<FichaTecnica, FetchError>) {
        if ticket.level != Level::Ficha || !self.is_current(ticket) {
            debug!("discarding stale ficha");
            return;
        }
        self.detail = match result {
            Ok(ficha) => DetailPanel::Ready(FichaView::from_ficha(&ficha)),
            Err(FetchError::NotFound) => DetailPanel::NotFound,
            Err(e) => {
                warn!(error = %e, selection = ?self.terminal_selection(), "failed to load ficha");
                DetailPanel::ConnectionError
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safra_types::SelectableItem;

    fn sp() -> Vec<SelectableItem> {
        vec![SelectableItem::new(1, "SP")]
    }

    #[test]
    fn clearing_state_issues_no_request_and_resets_downstream() {
        let mut cascade = Cascade::new();
        let ticket = cascade.state_changed(None);
        assert!(ticket.is_none());
        assert_eq!(cascade.cities, SelectorPhase::AwaitingParent);
        assert_eq!(cascade.products, SelectorPhase::AwaitingParent);
        assert_eq!(cascade.detail, DetailPanel::Prompt);
    }

    #[test]
    fn loaded_states_show_placeholder_plus_items() {
        let mut cascade = Cascade::new();
        let ticket = cascade.begin_states_load();
        cascade.apply_states(
            ticket,
            Ok(vec![SelectableItem::new(1, "SP"), SelectableItem::new(2, "MG")]),
        );
        assert!(cascade.states.is_enabled());
        assert_eq!(cascade.states.option_count(), 3);
        assert_eq!(placeholder(Level::States, &cascade.states), "Selecione o Estado");
    }

    #[test]
    fn failed_state_load_disables_selector() {
        let mut cascade = Cascade::new();
        let ticket = cascade.begin_states_load();
        cascade.apply_states(ticket, Err(FetchError::Transport("timeout".into())));
        assert_eq!(cascade.states, SelectorPhase::Failed);
        assert!(!cascade.states.is_enabled());
        assert_eq!(placeholder(Level::States, &cascade.states), "Erro ao carregar");
    }

    #[test]
    fn selecting_state_triggers_city_load_and_empty_result_disables() {
        let mut cascade = Cascade::new();
        let states_ticket = cascade.begin_states_load();
        cascade.apply_states(states_ticket, Ok(sp()));

        let ticket = cascade.state_changed(Some(ItemId::Num(1))).expect("city fetch issued");
        assert_eq!(ticket.level, Level::Cities);
        assert_eq!(cascade.cities, SelectorPhase::Loading);

        cascade.apply_cities(ticket, Ok(vec![]));
        assert_eq!(cascade.cities, SelectorPhase::Empty);
        assert!(!cascade.cities.is_enabled());
        assert_eq!(cascade.products, SelectorPhase::AwaitingParent);
    }

    #[test]
    fn empty_product_list_raises_inline_notice() {
        let mut cascade = Cascade::new();
        cascade.state_changed(Some(ItemId::Num(1)));
        let ticket = cascade.city_changed(Some(ItemId::Num(42))).unwrap();
        cascade.apply_products(ticket, Ok(vec![]));
        assert_eq!(cascade.products, SelectorPhase::Empty);
        assert_eq!(cascade.product_notice, Some(NO_PRODUCTS_NOTICE));
    }

    #[test]
    fn failed_product_list_raises_connection_notice() {
        let mut cascade = Cascade::new();
        cascade.state_changed(Some(ItemId::Num(1)));
        let ticket = cascade.city_changed(Some(ItemId::Num(42))).unwrap();
        cascade.apply_products(ticket, Err(FetchError::Http { status: 500, detail: "boom".into() }));
        assert_eq!(cascade.products, SelectorPhase::Failed);
        assert_eq!(cascade.product_notice, Some(PRODUCTS_ERROR_NOTICE));
    }

    #[test]
    fn stale_city_response_is_discarded() {
        let mut cascade = Cascade::new();
        let first = cascade.state_changed(Some(ItemId::Num(1))).unwrap();
        let second = cascade.state_changed(Some(ItemId::Num(2))).unwrap();

        // The response for the superseded selection resolves late.
        cascade.apply_cities(first, Ok(vec![SelectableItem::new(10, "Campinas")]));
        assert_eq!(cascade.cities, SelectorPhase::Loading);

        cascade.apply_cities(second, Ok(vec![SelectableItem::new(20, "Uberaba")]));
        assert!(cascade.cities.is_enabled());
        assert_eq!(cascade.cities.items()[0].label, "Uberaba");
    }

    #[test]
    fn full_chain_starts_ficha_fetch_and_not_found_is_distinct() {
        let mut cascade = Cascade::new();
        let cities = cascade.state_changed(Some(ItemId::Num(1))).unwrap();
        cascade.apply_cities(cities, Ok(vec![SelectableItem::new(42, "Bauru")]));
        let products = cascade.city_changed(Some(ItemId::Num(42))).unwrap();
        cascade.apply_products(products, Ok(vec![SelectableItem::new("Milho", "Milho")]));

        let ficha = cascade.product_changed(Some(ItemId::Text("Milho".into()))).unwrap();
        assert_eq!(ficha.level, Level::Ficha);
        assert_eq!(cascade.detail, DetailPanel::Loading);
        assert_eq!(
            cascade.terminal_selection(),
            Some((ItemId::Text("Milho".into()), ItemId::Num(42)))
        );

        cascade.apply_ficha(ficha, Err(FetchError::NotFound));
        assert_eq!(cascade.detail, DetailPanel::NotFound);
    }

    #[test]
    fn changing_state_resets_detail_and_invalidates_ficha() {
        let mut cascade = Cascade::new();
        cascade.state_changed(Some(ItemId::Num(1)));
        cascade.city_changed(Some(ItemId::Num(42)));
        let ficha = cascade.product_changed(Some(ItemId::Text("Uva".into()))).unwrap();

        cascade.state_changed(Some(ItemId::Num(2)));
        assert_eq!(cascade.detail, DetailPanel::Prompt);
        assert_eq!(cascade.products, SelectorPhase::AwaitingParent);

        // The in-flight sheet for the old chain resolves late and is dropped.
        cascade.apply_ficha(ficha, Ok(FichaTecnica::default()));
        assert_eq!(cascade.detail, DetailPanel::Prompt);
    }
}
