// Adapters layer: concrete implementations for external systems (http, storage, notify, display).

pub mod display;
pub mod http;
pub mod notify;
pub mod storage;

pub use display::TerminalDisplay;
pub use http::AladhanClient;
pub use notify::{LogNotifier, NotifierSet, SoundNotifier};
pub use storage::LocalStorage;
