use ratatui::layout::Rect;
use atmosphere_core::{Controller, Dispatcher, KeyValueStore, Provider, Reply, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub type Store = Box<dyn KeyValueStore>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Search input cursor, in chars
    pub query_cursor: usize,

    // Keyboard focus among pinned cards
    pub focused_card: usize,

    // Animation state
    pub animation_frame: u16,

    pub provider: Provider,
    pub controller: Controller<Store>,
    dispatcher: Dispatcher,

    // Card areas for mouse hit-testing (updated during render)
    pub card_areas: Vec<(Rect, String)>,
}

impl App {
    pub fn new(controller: Controller<Store>, dispatcher: Dispatcher, provider: Provider) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            query_cursor: 0,
            focused_card: 0,
            animation_frame: 0,
            provider,
            controller,
            dispatcher,
            card_areas: Vec::new(),
        }
    }

    fn dispatch(&self, request: Option<Request>) {
        if let Some(request) = request {
            self.dispatcher.dispatch(request);
        }
    }

    pub fn start(&mut self) {
        let request = self.controller.startup();
        self.dispatch(request);
    }

    pub fn apply_reply(&mut self, reply: Reply) {
        let request = self.controller.apply(reply);
        self.dispatch(request);
    }

    pub fn submit_search(&mut self) {
        let request = self.controller.submit_search();
        self.dispatch(request);
    }

    pub fn pin(&mut self) {
        if self.controller.pin() {
            self.query_cursor = 0;
            self.focused_card = self.controller.pinned().len().saturating_sub(1);
        }
    }

    pub fn toggle_language(&mut self) {
        let request = self.controller.toggle_language();
        self.dispatch(request);
    }

    pub fn focused_id(&self) -> Option<String> {
        self.controller
            .pinned()
            .get(self.focused_card)
            .map(|c| c.id.clone())
    }

    pub fn select_focused(&mut self) {
        if let Some(id) = self.focused_id() {
            self.select(&id);
        }
    }

    pub fn select(&mut self, id: &str) {
        if let Some(index) = self.controller.pinned().iter().position(|c| c.id == id) {
            self.focused_card = index;
        }
        let request = self.controller.select(id);
        self.dispatch(request);
    }

    pub fn delete_focused(&mut self) {
        let Some(id) = self.focused_id() else {
            return;
        };
        let request = self.controller.delete(&id);
        self.dispatch(request);

        let len = self.controller.pinned().len();
        if self.focused_card >= len {
            self.focused_card = len.saturating_sub(1);
        }
    }

    pub fn focus_next(&mut self) {
        let len = self.controller.pinned().len();
        if len > 0 {
            self.focused_card = (self.focused_card + 1).min(len - 1);
        }
    }

    pub fn focus_prev(&mut self) {
        self.focused_card = self.focused_card.saturating_sub(1);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
        self.controller.shutdown();
    }
}
