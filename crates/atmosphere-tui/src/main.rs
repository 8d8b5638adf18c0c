use anyhow::Result;
use atmosphere_core::logging::init_file_logging;
use atmosphere_core::{CityStore, Config, Controller, Dispatcher, FileKeyValueStore, MemoryKeyValueStore};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, Store};
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not read config ({}), using defaults", e);
        Config::new()
    });

    let data_dir = config.data_dir();

    // Logging must be set up before the terminal is taken over
    if let Some(dir) = &data_dir {
        if let Err(e) = init_file_logging(&dir.join("atmosphere.log"), config.log_level()) {
            eprintln!("Warning: {}", e);
        }
    }

    let backend: Store = match data_dir {
        Some(dir) => Box::new(FileKeyValueStore::new(dir)),
        None => {
            tracing::warn!("no data directory available, pinned cities will not persist");
            Box::new(MemoryKeyValueStore::new())
        }
    };

    let controller = Controller::new(CityStore::new(backend), config.language());
    let (dispatcher, mut replies) = Dispatcher::channel(config.build_oracle());
    let mut app = App::new(controller, dispatcher, config.provider());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    app.start();

    let result = run(&mut app, &mut terminal, &mut events, &mut replies).await;

    app.quit();
    tui::restore()?;

    // Remember the language choice for the next launch
    let language = app.controller.language();
    if language != config.language() {
        config.set_language(language);
        if let Err(e) = config.save() {
            tracing::warn!("failed to save config: {}", e);
        }
    }
    tracing::info!("session closed");

    result
}

async fn run(
    app: &mut App,
    terminal: &mut tui::Tui,
    events: &mut EventHandler,
    replies: &mut tokio::sync::mpsc::UnboundedReceiver<atmosphere_core::Reply>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event),
                None => break,
            },
            reply = replies.recv() => match reply {
                Some(reply) => app.apply_reply(reply),
                None => break,
            },
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
