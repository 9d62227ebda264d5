//! Application entry point — console clipboard translator.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (writing defaults on first run) and the
//!    [`LanguageCatalog`].
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the translate client, session state, event bus and
//!    [`TranslationService`].
//! 5. Build the speech [`PlaybackQueue`].
//! 6. Register console listeners on the [`Dispatcher`].
//! 7. Start the clipboard monitor thread and the hotkey listener thread.
//! 8. Drive the dispatcher and hotkeys on the main thread until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use clipboard_translator::{
    clipboard::{ClipboardMonitor, SystemClipboard},
    config::{AppConfig, AppPaths, LanguageCatalog},
    events::{AppEvent, Dispatcher, EventBus},
    hotkey::{HotkeyBindings, HotkeyEvent, HotkeyListener},
    pipeline::{new_shared_state, TranslationService},
    speech::{list_output_devices, PlaybackQueue, RodioPlayer},
    translate::{TranslateClient, Translator},
};

// ---------------------------------------------------------------------------
// Hotkey handling
// ---------------------------------------------------------------------------

fn handle_hotkey(
    event: HotkeyEvent,
    service: &TranslationService,
    playback: &PlaybackQueue,
    catalog: &LanguageCatalog,
) {
    let (source_language, target_language) = service.languages();

    let (text, language) = match event {
        HotkeyEvent::StopSpeaking => {
            playback.stop();
            return;
        }
        HotkeyEvent::SpeakTranslation => match service.latest() {
            Some((_, translation)) => (translation, target_language),
            None => {
                log::info!("Nothing translated yet");
                return;
            }
        },
        HotkeyEvent::SpeakSource => match service.latest() {
            Some((source, _)) => (source, source_language),
            None => {
                log::info!("Nothing copied yet");
                return;
            }
        },
    };

    let enders = catalog.sentence_enders_for(&language);
    let bus_done = service.bus().clone();
    let bus_err = service.bus().clone();

    let started = playback.play(
        &text,
        &language,
        &enders,
        move || bus_done.publish(AppEvent::PlaybackComplete),
        move |message| bus_err.publish(AppEvent::PlaybackError { message }),
    );
    if let Err(e) = started {
        log::error!("Could not start speech playback: {e}");
    }
}

// ---------------------------------------------------------------------------
// Console listeners
// ---------------------------------------------------------------------------

fn register_console_listeners(dispatcher: &mut Dispatcher) {
    dispatcher
        .on_new_text(|text| log::info!("Copied {} chars", text.chars().count()))
        .on_translation_started(|| log::debug!("Translating…"))
        .on_translation_ready(|source, translation| {
            println!("{source}\n→ {translation}\n");
        })
        .on_playback_complete(|| log::debug!("Speech finished"))
        .on_playback_error(|message| log::warn!("Speech failed: {message}"));
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Clipboard translator starting up");

    // 2. Configuration
    let paths = AppPaths::new();
    let config = AppConfig::load_or_create_at(&paths.settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let catalog = LanguageCatalog::load_or_builtin(&paths.languages_file);
    for code in [&config.translate.source_language, &config.translate.target_language] {
        if code != "auto" && !catalog.is_known(code) {
            log::warn!("Language '{code}' is not in the language list");
        }
    }

    // 3. Tokio runtime (2 worker threads for translation requests)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Translation pipeline
    let bus = EventBus::new();
    let mut dispatcher = Dispatcher::new(&bus);
    let translator: Arc<dyn Translator> = Arc::new(TranslateClient::from_config(&config.translate));
    let service = TranslationService::new(
        new_shared_state(&config),
        translator,
        bus,
        rt.handle().clone(),
    );

    // 5. Speech playback
    if let Some(wanted) = config.speech.output_device.as_deref() {
        match list_output_devices() {
            Ok(names) => log::debug!("Output devices: {names:?} (wanted '{wanted}')"),
            Err(e) => log::warn!("Could not list output devices: {e}"),
        }
    }
    let player = RodioPlayer::from_config(&config.speech).context("failed to build speech player")?;
    let playback = PlaybackQueue::new(Arc::new(player), &config.speech);

    // 6. Console presentation layer
    register_console_listeners(&mut dispatcher);

    // 7. Producers
    let mut monitor =
        ClipboardMonitor::spawn_for(SystemClipboard::new, service.clone(), &config.clipboard)
            .context("failed to spawn clipboard monitor")?;

    let (hotkey_tx, mut hotkey_rx) = mpsc::channel::<HotkeyEvent>(16);
    let _hotkey_listener = match HotkeyBindings::from_config(&config.hotkey) {
        Ok(bindings) => match HotkeyListener::start(bindings, hotkey_tx) {
            Ok(listener) => Some(listener),
            Err(e) => {
                log::warn!("Hotkeys unavailable: {e}");
                None
            }
        },
        Err(e) => {
            log::warn!("Hotkeys disabled: {e}");
            None
        }
    };

    let (source_language, target_language) = service.languages();
    log::info!(
        "Watching the clipboard ({source_language} → {target_language}); \
         {} speaks the translation, {} the source, {} stops. Ctrl-C quits.",
        config.hotkey.speak_translation_key,
        config.hotkey.speak_source_key,
        config.hotkey.stop_speaking_key,
    );

    // 8. Event loop
    rt.block_on(async {
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = dispatcher.dispatch_next() => {
                    if event.is_none() {
                        break;
                    }
                }
                Some(hotkey) = hotkey_rx.recv() => {
                    handle_hotkey(hotkey, &service, &playback, &catalog);
                }
                _ = &mut shutdown => {
                    log::info!("Shutting down");
                    break;
                }
            }
        }
    });

    monitor.stop();
    playback.stop();
    Ok(())
}
