// SPDX-License-Identifier: MPL-2.0

pub mod router;
mod session;
pub mod settings;

pub use router::{Navigation, Route, RouteGuard};
pub use session::{AuthToken, SessionError, SessionGate};
pub use settings::{NotificationKind, NotificationPrefs, Settings, SettingsError, UserProfile};
