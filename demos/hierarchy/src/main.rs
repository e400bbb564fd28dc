//! Hierarchy Demo
//!
//! A property store that reports every change through a Ripple event type
//! tree. Listeners attach at different depths of the tree and only see the
//! events below the node they registered for:
//!
//! ```text
//! ANY ◀──────────────────────────── audit (counts everything)
//! ├── CHANGE ◀───────────────────── change log
//! │   ├── ADD_PROPERTY
//! │   ├── SET_PROPERTY ◀─────────── veto (optional)
//! │   └── CLEAR_PROPERTY
//! └── ERROR ◀────────────────────── error report
//!     └── WRITE_ERROR
//! ```
//!
//! Several threads update the store at once while the listeners run.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package hierarchy -- --threads 8 --rounds 50 --veto app.theme
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use clap::Parser;
use parking_lot::Mutex;
use ripple::prelude::*;
use ripple::runtime::{init_from_config, validate_config};

const KEYS: [&str; 4] = ["app.theme", "app.locale", "user.name", "user.email"];

#[derive(Parser, Debug)]
#[command(name = "hierarchy", about = "Hierarchical event delivery demo")]
struct Args {
    /// Configuration file; the default locations are searched when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile
    #[arg(short, long)]
    profile: Option<String>,

    /// Threads updating the store concurrently
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Updates per thread
    #[arg(short, long, default_value_t = 25)]
    rounds: usize,

    /// Reject every update of this key
    #[arg(long)]
    veto: Option<String>,
}

// ============================================================================
// Event Types
// ============================================================================

struct EventTypes {
    change: EventType,
    add_property: EventType,
    set_property: EventType,
    clear_property: EventType,
    error: EventType,
    write_error: EventType,
}

impl EventTypes {
    fn new() -> Self {
        let change = EventType::child("CHANGE", EventType::any());
        let error = EventType::child("ERROR", EventType::any());
        Self {
            add_property: EventType::child("ADD_PROPERTY", &change),
            set_property: EventType::child("SET_PROPERTY", &change),
            clear_property: EventType::child("CLEAR_PROPERTY", &change),
            write_error: EventType::child("WRITE_ERROR", &error),
            change,
            error,
        }
    }
}

/// A property update, fired once before and once after it is applied.
struct PropertyEvent {
    base: BasicEvent,
    key: String,
    value: Option<String>,
    before_update: bool,
}

impl Event for PropertyEvent {
    fn event_type(&self) -> &EventType {
        self.base.event_type()
    }

    fn source(&self) -> &SourceRef {
        self.base.source()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An update that was rejected by a listener.
struct ErrorEvent {
    base: BasicEvent,
    key: String,
    cause: String,
}

impl Event for ErrorEvent {
    fn event_type(&self) -> &EventType {
        self.base.event_type()
    }

    fn source(&self) -> &SourceRef {
        self.base.source()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Property Store
// ============================================================================

struct PropertyStore {
    source: SourceRef,
    types: EventTypes,
    properties: Mutex<BTreeMap<String, String>>,
    listeners: EventListenerList,
}

impl PropertyStore {
    fn new(name: &str) -> Self {
        Self {
            source: SourceRef::new(name.to_string()),
            types: EventTypes::new(),
            properties: Mutex::new(BTreeMap::new()),
            listeners: EventListenerList::new(),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let event_type = if self.properties.lock().contains_key(key) {
            &self.types.set_property
        } else {
            &self.types.add_property
        };

        self.update(event_type, key, Some(value), |properties| {
            properties.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.update(&self.types.clear_property, key, None, |properties| {
            properties.remove(key);
        })
    }

    fn update(
        &self,
        event_type: &EventType,
        key: &str,
        value: Option<&str>,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<()> {
        if let Err(err) = self.fire_change(event_type, key, value, true) {
            self.listeners.fire(&BoxedEvent::new(ErrorEvent {
                base: BasicEvent::new(self.source.clone(), self.types.write_error.clone()),
                key: key.to_string(),
                cause: err.to_string(),
            }))?;
            return Err(err.into());
        }

        apply(&mut self.properties.lock());

        self.fire_change(event_type, key, value, false)?;
        Ok(())
    }

    fn fire_change(
        &self,
        event_type: &EventType,
        key: &str,
        value: Option<&str>,
        before_update: bool,
    ) -> RippleResult<()> {
        self.listeners.fire(&BoxedEvent::new(PropertyEvent {
            base: BasicEvent::new(self.source.clone(), event_type.clone()),
            key: key.to_string(),
            value: value.map(str::to_string),
            before_update,
        }))
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Counts events per event type.
#[derive(Default)]
struct AuditListener {
    counts: Mutex<BTreeMap<String, usize>>,
}

impl EventListener for AuditListener {
    fn on_event(&self, event: &BoxedEvent) -> Result<()> {
        *self
            .counts
            .lock()
            .entry(event.event_type().name().to_string())
            .or_default() += 1;
        Ok(())
    }
}

fn change_log() -> BoxedListener {
    into_listener(|event| {
        if let Some(change) = event.downcast_ref::<PropertyEvent>()
            && !change.before_update
        {
            debug!(
                event_type = %change.event_type(),
                key = %change.key,
                value = change.value.as_deref().unwrap_or("<cleared>"),
                "Property changed"
            );
        }
        Ok(())
    })
}

fn veto(rejected_key: String) -> BoxedListener {
    into_listener(move |event| {
        if let Some(change) = event.downcast_ref::<PropertyEvent>()
            && change.before_update
            && change.key == rejected_key
        {
            bail!("updates of `{}` are not allowed", change.key);
        }
        Ok(())
    })
}

fn error_report(reported: Arc<AtomicUsize>) -> BoxedListener {
    into_listener(move |event| {
        if let Some(error) = event.downcast_ref::<ErrorEvent>() {
            reported.fetch_add(1, Ordering::Relaxed);
            warn!(
                source = ?error.source(),
                key = %error.key,
                cause = %error.cause,
                "Property update rejected"
            );
        }
        Ok(())
    })
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    let config = loader.load()?;
    validate_config(&config)?;
    init_from_config(&config.logging);

    let store = PropertyStore::new("settings");
    let types = &store.types;

    let audit = Arc::new(AuditListener::default());
    let reported = Arc::new(AtomicUsize::new(0));

    store
        .listeners
        .add_event_listener(EventType::any(), &BoxedListener::from_arc(Arc::clone(&audit)))?;
    store
        .listeners
        .add_event_listener(&types.change, &change_log())?;
    store
        .listeners
        .add_event_listener(&types.error, &error_report(Arc::clone(&reported)))?;
    if let Some(key) = args.veto.clone() {
        store
            .listeners
            .add_event_listener(&types.set_property, &veto(key))?;
    }

    info!(
        registrations = store.listeners.len(),
        set_listeners = store.listeners.event_listeners(&types.set_property).iter().count(),
        add_listeners = store.listeners.event_listeners(&types.add_property).iter().count(),
        change_subscribers = store.listeners.registrations_for_super_type(&types.change).len(),
        "Listeners registered"
    );

    let rejected = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for thread in 0..args.threads {
            let store = &store;
            let rejected = &rejected;
            scope.spawn(move || {
                for round in 0..args.rounds {
                    let key = KEYS[(thread + round) % KEYS.len()];
                    let result = if round % 5 == 4 {
                        store.clear(key)
                    } else {
                        store.set(key, &format!("value-{thread}-{round}"))
                    };
                    if let Err(err) = result {
                        debug!(thread, key, error = %err, "Update failed");
                        rejected.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    println!("Events seen by the audit listener:");
    for (event_type, count) in audit.counts.lock().iter() {
        println!("  {event_type:<16} {count}");
    }
    println!(
        "Rejected updates: {} (reported through ERROR: {})",
        rejected.load(Ordering::Relaxed),
        reported.load(Ordering::Relaxed)
    );
    println!("Final properties:");
    for (key, value) in store.properties.lock().iter() {
        println!("  {key} = {value}");
    }

    Ok(())
}
