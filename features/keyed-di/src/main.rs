use std::{
    error::Error,
    fmt::Debug,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use keyed_di::{
    global, ContainerSettings, Dependencies, InjectionKey, Injectable, Lifecycle, Provide,
    ResolutionError,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = ContainerSettings::default().panic_on_cycle(cfg!(debug_assertions));
    let deps = global::install(Dependencies::with_settings(settings))?;
    register_screens(deps);

    let mut navigator = Navigator::default();
    navigator.present(&PROFILE_SCREEN);
    navigator.present(&PROFILE_SCREEN);
    navigator.embed(&SETTINGS_SCREEN); // never registered, skipped

    println!("{deps:?}");
    for (depth, screen) in navigator.stack.iter().enumerate() {
        println!("{depth}: {screen}");
    }

    let session = deps.provide(&SESSION)?;
    println!("session of '{}' is shared by all screens", session.user);
    Ok(())
}

#[derive(Debug)]
struct Session {
    user: String,
}

#[derive(Debug)]
#[allow(dead_code)]
struct ProfileScreen {
    serial: usize,
    session: Arc<Session>,
}

#[derive(Debug)]
#[allow(dead_code)]
struct SettingsScreen;

const SESSION: InjectionKey<Session> = InjectionKey::new("session");
const PROFILE_SCREEN: InjectionKey<ProfileScreen> = InjectionKey::new("profile_screen");
const SETTINGS_SCREEN: InjectionKey<SettingsScreen> = InjectionKey::new("settings_screen");

fn register_screens(deps: &Dependencies) {
    deps.register_instance(
        &SESSION,
        Session {
            user: "satoshi".to_string(),
        },
    );

    let serials = AtomicUsize::new(0);
    deps.register(&PROFILE_SCREEN, Lifecycle::Transient, move |r| {
        Ok::<_, ResolutionError>(ProfileScreen {
            serial: serials.fetch_add(1, Ordering::Relaxed),
            session: r.provide(&SESSION)?,
        })
    });
}

/// Stand-in for the screen presenting glue, which only resolves and records
///
/// A screen that can't be built is skipped after logging. Development builds
/// additionally panic, except for embeds whose key was never registered, which
/// stand for features this build leaves out.
#[derive(Default)]
struct Navigator {
    stack: Vec<String>,
}

impl Navigator {
    fn present<T: Injectable + Debug>(&mut self, key: &InjectionKey<T>) -> Option<Arc<T>> {
        let screen = global::shared_or_install_default().provide_or_log(key);
        if screen.is_none() && cfg!(debug_assertions) {
            panic!("Unable to present '{key}'");
        }

        let screen = screen?;
        self.stack.push(format!("presented {screen:?}"));
        Some(screen)
    }

    fn embed<T: Injectable + Debug>(&mut self, key: &InjectionKey<T>) -> Option<Arc<T>> {
        let screen = match global::shared_or_install_default().provide_optional(key) {
            Ok(screen) => screen?,
            Err(error) => {
                tracing::error!(key = key.name(), "Unable to embed '{key}': {error}");
                if cfg!(debug_assertions) {
                    panic!("Unable to embed '{key}': {error}");
                }
                return None;
            }
        };

        self.stack.push(format!("embedded {screen:?}"));
        Some(screen)
    }
}
